use super::atom::AtomRecord;

/// An ordered set of atoms with a free-text comment, the in-memory form of an XYZ file.
///
/// The atom count written in the XYZ header is always derived from [`Self::atoms`], so a
/// document can never disagree with itself about how many atoms it holds.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GeometryDocument {
    /// The comment (second) line of the XYZ representation.
    pub comment: String,
    atoms: Vec<AtomRecord>,
}

impl GeometryDocument {
    /// Creates a document from a comment and an ordered list of atoms.
    pub fn new(comment: &str, atoms: Vec<AtomRecord>) -> Self {
        Self {
            comment: comment.to_string(),
            atoms,
        }
    }

    pub fn atoms(&self) -> &[AtomRecord] {
        &self.atoms
    }

    pub fn atom_count(&self) -> usize {
        self.atoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    pub fn push(&mut self, atom: AtomRecord) {
        self.atoms.push(atom);
    }

    pub fn into_atoms(self) -> Vec<AtomRecord> {
        self.atoms
    }
}
