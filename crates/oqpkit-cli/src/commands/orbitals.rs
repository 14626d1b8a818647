use crate::cli::OrbitalsArgs;
use crate::error::Result;
use oqpkit::core::models::orbitals::{MoBlock, MoldenDocument};
use oqpkit::workflows;

pub fn run(args: OrbitalsArgs) -> Result<()> {
    let output = match args.index {
        Some(index) => {
            let orbital = workflows::orbitals::select_orbital(&args.molden, index)?;
            render_orbital(index, &orbital)
        }
        None => {
            let document = workflows::orbitals::load_orbitals(&args.molden)?;
            render_summary(&document)
        }
    };
    print!("{}", output);
    Ok(())
}

fn render_summary(document: &MoldenDocument) -> String {
    let mut out = format!("Atoms: {}\n", document.atoms.len());
    for atom in &document.atoms {
        out.push_str(&format!(
            "  {:<2} {:>12.6} {:>12.6} {:>12.6}\n",
            atom.symbol,
            atom.x(),
            atom.y(),
            atom.z()
        ));
    }
    out.push_str(&format!("Orbitals: {}\n", document.orbital_count()));
    for (index, orbital) in document.orbitals().iter().enumerate() {
        out.push_str(&format!(
            "  #{:<4} sym={:<6} energy={:<14} occ={:<8} spin={}\n",
            index,
            orbital.symmetry().unwrap_or("-"),
            fmt_optional(orbital.energy()),
            fmt_optional(orbital.occupation()),
            orbital.spin().unwrap_or("-"),
        ));
    }
    out
}

fn render_orbital(index: usize, orbital: &MoBlock) -> String {
    let mut out = format!("Orbital #{} ({} lines)\n", index, orbital.len());
    for line in orbital.lines() {
        out.push_str(line);
        out.push('\n');
    }
    out
}

fn fmt_optional(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}
