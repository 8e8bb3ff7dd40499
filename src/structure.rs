//! Representative-point extraction from predicted structure files.
//!
//! Each residue contributes exactly one point to the contact computation:
//! the beta carbon for amino acids, the alpha carbon for glycine and the
//! phosphorus atom for nucleotides. Heteroatom records carry no residue
//! frame, so each one is kept as its own point. Points are emitted in file
//! order, which matches the token order of the confidence output.

use crate::error::{Error, Result};
use nalgebra::Vector3;
use pdbtbx::*;
use std::path::Path;

/// One representative point of a residue.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResiduePoint {
    /// Cartesian coordinates of the representative atom.
    pub pos: Vector3<f64>,
    /// Whether the representative atom is a phosphorus.
    pub phosphorus: bool,
}

/// Open a structure file and keep only atomic coordinates.
pub fn load_structure(path: &Path) -> Result<PDB> {
    let input = path
        .to_str()
        .ok_or_else(|| Error::Config(format!("non UTF-8 path: {}", path.display())))?;
    let (pdb, _warnings) = ReadOptions::default()
        .set_only_atomic_coords(true)
        .set_level(StrictnessLevel::Loose)
        .read(input)
        .map_err(|errors| Error::Structure {
            path: path.to_path_buf(),
            message: errors
                .iter()
                .map(|e| e.to_string())
                .collect::<Vec<_>>()
                .join("; "),
        })?;
    Ok(pdb)
}

/// Extract the representative point of every residue, in file order.
pub fn representative_points(path: &Path) -> Result<Vec<ResiduePoint>> {
    let pdb = load_structure(path)?;
    Ok(pdb
        .atoms_with_hierarchy()
        .filter(|hier| selects(hier.residue().name().unwrap_or(""), hier.atom()))
        .map(|hier| {
            let (x, y, z) = hier.atom().pos();
            ResiduePoint {
                pos: Vector3::new(x, y, z),
                phosphorus: hier.atom().element() == Some(&Element::P),
            }
        })
        .collect())
}

/// Whether this atom is the representative of its residue.
fn selects(resn: &str, atom: &Atom) -> bool {
    if atom.hetero() {
        return true;
    }
    match resn.to_uppercase().as_str() {
        "A" | "C" | "G" | "U" | "DA" | "DC" | "DG" | "DT" => atom.name() == "P",
        "GLY" => atom.name() == "CA",
        _ => atom.name() == "CB",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const ATOM_SITE_HEADER: &str = "data_test\n\
        loop_\n\
        _atom_site.group_PDB\n\
        _atom_site.id\n\
        _atom_site.type_symbol\n\
        _atom_site.label_atom_id\n\
        _atom_site.label_alt_id\n\
        _atom_site.label_comp_id\n\
        _atom_site.label_asym_id\n\
        _atom_site.label_entity_id\n\
        _atom_site.label_seq_id\n\
        _atom_site.pdbx_PDB_ins_code\n\
        _atom_site.Cartn_x\n\
        _atom_site.Cartn_y\n\
        _atom_site.Cartn_z\n\
        _atom_site.occupancy\n\
        _atom_site.B_iso_or_equiv\n\
        _atom_site.auth_seq_id\n\
        _atom_site.auth_asym_id\n\
        _atom_site.pdbx_PDB_model_num\n";

    struct CifRecord {
        group: &'static str,
        element: &'static str,
        atom: &'static str,
        resn: &'static str,
        chain: &'static str,
        resi: usize,
        pos: (f64, f64, f64),
    }

    fn write_cif(records: &[CifRecord]) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.cif");
        let mut file = std::fs::File::create(&path).unwrap();
        write!(file, "{ATOM_SITE_HEADER}").unwrap();
        for (serial, r) in records.iter().enumerate() {
            writeln!(
                file,
                "{} {} {} {} . {} {} 1 {} ? {:.3} {:.3} {:.3} 1.00 0.00 {} {} 1",
                r.group,
                serial + 1,
                r.element,
                r.atom,
                r.resn,
                r.chain,
                r.resi,
                r.pos.0,
                r.pos.1,
                r.pos.2,
                r.resi,
                r.chain,
            )
            .unwrap();
        }
        (dir, path)
    }

    #[test]
    fn beta_carbons_are_selected() {
        let (_dir, path) = write_cif(&[
            CifRecord {
                group: "ATOM",
                element: "N",
                atom: "N",
                resn: "ALA",
                chain: "A",
                resi: 1,
                pos: (0.0, 0.0, 0.0),
            },
            CifRecord {
                group: "ATOM",
                element: "C",
                atom: "CA",
                resn: "ALA",
                chain: "A",
                resi: 1,
                pos: (1.0, 0.0, 0.0),
            },
            CifRecord {
                group: "ATOM",
                element: "C",
                atom: "CB",
                resn: "ALA",
                chain: "A",
                resi: 1,
                pos: (2.0, 0.0, 0.0),
            },
        ]);
        let points = representative_points(&path).unwrap();
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].pos, Vector3::new(2.0, 0.0, 0.0));
        assert!(!points[0].phosphorus);
    }

    #[test]
    fn glycine_falls_back_to_alpha_carbon() {
        let (_dir, path) = write_cif(&[
            CifRecord {
                group: "ATOM",
                element: "N",
                atom: "N",
                resn: "GLY",
                chain: "A",
                resi: 1,
                pos: (0.0, 0.0, 0.0),
            },
            CifRecord {
                group: "ATOM",
                element: "C",
                atom: "CA",
                resn: "GLY",
                chain: "A",
                resi: 1,
                pos: (1.5, 0.0, 0.0),
            },
        ]);
        let points = representative_points(&path).unwrap();
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].pos, Vector3::new(1.5, 0.0, 0.0));
    }

    #[test]
    fn nucleotides_use_the_phosphorus_atom() {
        let (_dir, path) = write_cif(&[
            CifRecord {
                group: "ATOM",
                element: "P",
                atom: "P",
                resn: "DA",
                chain: "B",
                resi: 1,
                pos: (0.0, 1.0, 0.0),
            },
            CifRecord {
                group: "ATOM",
                element: "C",
                atom: "C1'",
                resn: "DA",
                chain: "B",
                resi: 1,
                pos: (3.0, 1.0, 0.0),
            },
        ]);
        let points = representative_points(&path).unwrap();
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].pos, Vector3::new(0.0, 1.0, 0.0));
        assert!(points[0].phosphorus);
    }

    #[test]
    fn heteroatoms_pass_through_individually() {
        let (_dir, path) = write_cif(&[
            CifRecord {
                group: "ATOM",
                element: "C",
                atom: "CB",
                resn: "SER",
                chain: "A",
                resi: 1,
                pos: (0.0, 0.0, 0.0),
            },
            CifRecord {
                group: "HETATM",
                element: "MG",
                atom: "MG",
                resn: "MG",
                chain: "C",
                resi: 1,
                pos: (5.0, 5.0, 5.0),
            },
            CifRecord {
                group: "HETATM",
                element: "P",
                atom: "PA",
                resn: "ATP",
                chain: "C",
                resi: 2,
                pos: (6.0, 5.0, 5.0),
            },
        ]);
        let points = representative_points(&path).unwrap();
        assert_eq!(points.len(), 3);
        assert!(!points[1].phosphorus);
        assert!(points[2].phosphorus);
    }

    #[test]
    fn missing_structure_file_is_an_error() {
        let err = representative_points(Path::new("no_such_model.cif")).unwrap_err();
        assert!(matches!(err, Error::Structure { .. }));
    }
}
