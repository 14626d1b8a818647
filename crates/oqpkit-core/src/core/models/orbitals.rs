use super::atom::AtomRecord;

/// The raw lines of one molecular orbital in a Molden `[MO]` section.
///
/// Lines are kept verbatim (trimmed). Metadata such as the orbital energy is parsed on
/// demand from the `key=value` lines of the block.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MoBlock {
    lines: Vec<String>,
}

impl MoBlock {
    pub fn new(lines: Vec<String>) -> Self {
        Self { lines }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// The orbital symmetry label (`Sym=`), if present.
    pub fn symmetry(&self) -> Option<&str> {
        self.metadata("sym")
    }

    /// The spin channel (`Spin=`), if present.
    pub fn spin(&self) -> Option<&str> {
        self.metadata("spin")
    }

    /// The orbital energy in Hartree (`Ene=`), if present and numeric.
    pub fn energy(&self) -> Option<f64> {
        self.metadata("ene").and_then(|v| v.parse().ok())
    }

    /// The occupation number (`Occup=`), if present and numeric.
    pub fn occupation(&self) -> Option<f64> {
        self.metadata("occup").and_then(|v| v.parse().ok())
    }

    /// Lines that are not `key=value` metadata, i.e. the basis-function coefficients.
    pub fn coefficient_lines(&self) -> impl Iterator<Item = &str> {
        self.lines
            .iter()
            .map(String::as_str)
            .filter(|line| !is_metadata_line(line))
    }

    fn metadata(&self, key: &str) -> Option<&str> {
        self.lines.iter().find_map(|line| {
            let (k, v) = line.split_once('=')?;
            k.trim().eq_ignore_ascii_case(key).then(|| v.trim())
        })
    }
}

/// Returns `true` for `key=value` lines such as `Sym= 1a` or `Ene= -20.55`.
pub(crate) fn is_metadata_line(line: &str) -> bool {
    line.contains('=')
}

/// Atoms and molecular orbitals recovered from a Molden file.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MoldenDocument {
    pub atoms: Vec<AtomRecord>,
    orbital_lines: Vec<String>,
    orbitals: Vec<MoBlock>,
}

impl MoldenDocument {
    /// Builds a document from its atoms and the flat `[MO]` line capture.
    ///
    /// The capture is split into orbitals wherever a metadata line follows a coefficient
    /// line. A capture without any metadata lines becomes a single block.
    pub fn new(atoms: Vec<AtomRecord>, orbital_lines: Vec<String>) -> Self {
        let orbitals = group_orbital_lines(&orbital_lines);
        Self {
            atoms,
            orbital_lines,
            orbitals,
        }
    }

    /// Every line captured from `[MO]` sections, in file order.
    pub fn orbital_lines(&self) -> &[String] {
        &self.orbital_lines
    }

    pub fn orbitals(&self) -> &[MoBlock] {
        &self.orbitals
    }

    pub fn orbital_count(&self) -> usize {
        self.orbitals.len()
    }
}

fn group_orbital_lines(lines: &[String]) -> Vec<MoBlock> {
    let mut blocks = Vec::new();
    let mut current: Vec<String> = Vec::new();
    let mut seen_coefficient = false;

    for line in lines {
        let metadata = is_metadata_line(line);
        if metadata && seen_coefficient {
            blocks.push(MoBlock::new(std::mem::take(&mut current)));
            seen_coefficient = false;
        }
        if !metadata {
            seen_coefficient = true;
        }
        current.push(line.clone());
    }
    if !current.is_empty() {
        blocks.push(MoBlock::new(current));
    }
    blocks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn grouping_splits_on_metadata_after_coefficients() {
        let doc = MoldenDocument::new(
            Vec::new(),
            lines(&[
                "Sym= 1a",
                "Ene= -20.5",
                "Spin= Alpha",
                "Occup= 2.0",
                "1 0.99",
                "2 0.02",
                "Sym= 2a",
                "Ene= -1.3",
                "Spin= Alpha",
                "Occup= 2.0",
                "1 -0.21",
            ]),
        );

        assert_eq!(doc.orbital_count(), 2);
        assert_eq!(doc.orbital_lines().len(), 11);
        assert_eq!(doc.orbitals()[0].len(), 6);
        assert_eq!(doc.orbitals()[1].len(), 5);
        assert_eq!(doc.orbitals()[1].lines()[0], "Sym= 2a");
    }

    #[test]
    fn capture_without_metadata_forms_single_block() {
        let doc = MoldenDocument::new(Vec::new(), lines(&["1 0.5", "2 0.4", "3 0.1"]));
        assert_eq!(doc.orbital_count(), 1);
        assert_eq!(doc.orbitals()[0].len(), 3);
    }

    #[test]
    fn empty_capture_has_no_orbitals() {
        let doc = MoldenDocument::new(Vec::new(), Vec::new());
        assert_eq!(doc.orbital_count(), 0);
        assert!(doc.orbital_lines().is_empty());
    }

    #[test]
    fn metadata_accessors_parse_block_headers() {
        let block = MoBlock::new(lines(&[
            "Sym= 1a",
            "Ene= -20.5543",
            "Spin= Alpha",
            "Occup= 2.000000",
            "1 0.994",
            "2 0.026",
        ]));

        assert_eq!(block.symmetry(), Some("1a"));
        assert_eq!(block.spin(), Some("Alpha"));
        assert_eq!(block.energy(), Some(-20.5543));
        assert_eq!(block.occupation(), Some(2.0));
        assert_eq!(block.coefficient_lines().count(), 2);
    }

    #[test]
    fn metadata_accessors_return_none_when_missing() {
        let block = MoBlock::new(lines(&["1 0.5", "Ene= not-a-number"]));
        assert_eq!(block.symmetry(), None);
        assert_eq!(block.energy(), None);
        assert_eq!(block.occupation(), None);
    }
}
