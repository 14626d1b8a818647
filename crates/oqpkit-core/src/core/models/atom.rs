use nalgebra::Point3;

/// A single atom of a geometry: its element symbol and Cartesian position.
///
/// Coordinates are always stored in Ångström. Readers of formats that use other
/// units convert on the way in, so every `AtomRecord` in the crate is directly
/// comparable.
#[derive(Debug, Clone, PartialEq)]
pub struct AtomRecord {
    /// The chemical symbol (e.g., "O", "Cl"), or the `"X"` placeholder for unknown elements.
    pub symbol: String,
    /// The Cartesian position in Ångström.
    pub position: Point3<f64>,
}

impl AtomRecord {
    /// Creates a new atom record.
    ///
    /// # Arguments
    ///
    /// * `symbol` - The element symbol.
    /// * `position` - The Cartesian position in Ångström.
    pub fn new(symbol: &str, position: Point3<f64>) -> Self {
        Self {
            symbol: symbol.to_string(),
            position,
        }
    }

    pub fn x(&self) -> f64 {
        self.position.x
    }

    pub fn y(&self) -> f64 {
        self.position.y
    }

    pub fn z(&self) -> f64 {
        self.position.z
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_atom_stores_symbol_and_position() {
        let atom = AtomRecord::new("O", Point3::new(0.0, -0.757, 0.587));

        assert_eq!(atom.symbol, "O");
        assert_eq!(atom.position, Point3::new(0.0, -0.757, 0.587));
        assert_eq!(atom.x(), 0.0);
        assert_eq!(atom.y(), -0.757);
        assert_eq!(atom.z(), 0.587);
    }

    #[test]
    fn atom_equality_and_clone_works() {
        let atom = AtomRecord::new("H", Point3::new(1.0, 2.0, 3.0));
        let cloned = atom.clone();
        assert_eq!(atom, cloned);

        let moved = AtomRecord::new("H", Point3::new(1.0, 2.0, 3.5));
        assert_ne!(atom, moved);
    }
}
