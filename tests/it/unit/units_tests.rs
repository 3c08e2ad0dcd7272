//! Unit tests for the unit conversion table.

use printfit::types::{PrintLocation, Rect};
use printfit::units::{DEFAULT_PRINT_TABLE, PrintSpec, PrintTable, pixels_per_inch};

#[test]
fn test_front_spec() {
    let spec = DEFAULT_PRINT_TABLE.get(PrintLocation::Front);
    assert_eq!(spec.area, Rect::new(167.5, 135.0, 165.0, 255.0));
    assert_eq!(spec.max.width, 11.0);
    assert_eq!(spec.max.height, 17.0);
}

#[test]
fn test_default_table_is_uniform_resolution() {
    for location in PrintLocation::ALL {
        let ppi = pixels_per_inch(location);
        assert_eq!(ppi.x, 15.0, "{location} x");
        assert_eq!(ppi.y, 15.0, "{location} y");
    }
}

#[test]
fn test_ppi_is_per_axis() {
    let spec = PrintSpec::new(Rect::new(0.0, 0.0, 100.0, 300.0), 10.0, 10.0);
    let ppi = spec.pixels_per_inch();
    assert_eq!(ppi.x, 10.0);
    assert_eq!(ppi.y, 30.0);
}

#[test]
fn test_every_location_has_a_spec() {
    let table = PrintTable::default();
    assert!(table.is_valid());
    for location in PrintLocation::ALL {
        assert_eq!(table.print_area(location), table.get(location).area);
        assert_eq!(table.max_dimensions(location), table.get(location).max);
    }
}

#[test]
fn test_zero_area_is_invalid() {
    let mut table = PrintTable::default();
    table.right_chest.area.width = 0.0;
    assert!(!table.is_valid());
}

#[test]
fn test_location_names_round_trip() {
    for location in PrintLocation::ALL {
        assert_eq!(location.as_str().parse::<PrintLocation>(), Ok(location));
    }
    assert!("sleeve".parse::<PrintLocation>().is_err());
}
