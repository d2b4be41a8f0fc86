use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::mesh::Mesh;
use crate::render::Rgb;

/// One mesh object in an OBJ file, with a color per face.
pub struct ObjPart<'a> {
    pub name: &'a str,
    pub mesh: &'a Mesh,
    pub colors: &'a [Rgb],
}

/// Snap a channel onto `levels` evenly spaced 8-bit values.
pub fn posterize(channel: f32, levels: u32) -> u8 {
    let steps = (levels.max(2) - 1) as f32;
    let q = (channel.clamp(0.0, 1.0) * steps).round() / steps;
    (q * 255.0).round() as u8
}

fn material_name(c: [u8; 3]) -> String {
    format!("mat_{:02x}{:02x}{:02x}", c[0], c[1], c[2])
}

/// Write `<stem>.obj` and `<stem>.mtl` into `dir`.
///
/// Colors are posterized and every distinct color becomes one material; faces
/// are grouped by material. With `y_up`, vertices are rotated from Z-up to
/// Y-up as `(x, z, -y)`.
pub fn write_obj_mtl(dir: &Path, stem: &str, parts: &[ObjPart<'_>], levels: u32, y_up: bool) -> Result<(PathBuf, PathBuf)> {
    std::fs::create_dir_all(dir)?;
    let obj_path = dir.join(format!("{stem}.obj"));
    let mtl_path = dir.join(format!("{stem}.mtl"));

    let quantized: Vec<Vec<[u8; 3]>> = parts
        .iter()
        .map(|p| {
            p.colors
                .iter()
                .map(|c| [posterize(c[0], levels), posterize(c[1], levels), posterize(c[2], levels)])
                .collect()
        })
        .collect();

    let mut mtl = BufWriter::new(File::create(&mtl_path)?);
    let mut seen = BTreeMap::new();
    for c in quantized.iter().flatten() {
        seen.entry(*c).or_insert(());
    }
    for c in seen.keys() {
        writeln!(mtl, "newmtl {}", material_name(*c))?;
        writeln!(
            mtl,
            "Kd {:.6} {:.6} {:.6}",
            c[0] as f32 / 255.0,
            c[1] as f32 / 255.0,
            c[2] as f32 / 255.0
        )?;
        writeln!(mtl, "Ka 0.000000 0.000000 0.000000")?;
        writeln!(mtl, "Ks 0.000000 0.000000 0.000000")?;
        writeln!(mtl, "d 1.0")?;
        writeln!(mtl, "illum 1")?;
        writeln!(mtl)?;
    }
    mtl.flush()?;

    let mut obj = BufWriter::new(File::create(&obj_path)?);
    let mtl_name = mtl_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    writeln!(obj, "mtllib {mtl_name}")?;

    // OBJ indices are 1-based and global across objects.
    let mut base = 1u32;
    for (part, colors) in parts.iter().zip(&quantized) {
        writeln!(obj, "o {}", part.name)?;
        for v in &part.mesh.vertices {
            let [x, y, z] = if y_up { [v[0], v[2], -v[1]] } else { *v };
            writeln!(obj, "v {x:.6} {y:.6} {z:.6}")?;
        }

        let mut groups: BTreeMap<[u8; 3], Vec<usize>> = BTreeMap::new();
        for (f, c) in colors.iter().enumerate() {
            groups.entry(*c).or_default().push(f);
        }
        for (c, faces) in &groups {
            writeln!(obj, "usemtl {}", material_name(*c))?;
            for &f in faces {
                let [a, b, d] = part.mesh.faces[f];
                writeln!(obj, "f {} {} {}", a + base, b + base, d + base)?;
            }
        }
        base += part.mesh.vertices.len() as u32;
    }
    obj.flush()?;

    tracing::info!(obj = %obj_path.display(), materials = seen.len(), "mesh exported");
    Ok((obj_path, mtl_path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn posterize_snaps_to_levels() {
        assert_eq!(posterize(0.0, 16), 0);
        assert_eq!(posterize(1.0, 16), 255);
        assert_eq!(posterize(0.5, 2), 255);
        assert_eq!(posterize(0.49, 2), 0);
        assert_eq!(posterize(0.5, 3), 128);
    }

    #[test]
    fn writes_materials_and_faces() {
        let dir = std::env::temp_dir().join(format!("tectogen-export-{}", std::process::id()));
        let mesh = Mesh::icosahedron(1.0);
        let colors: Vec<Rgb> = (0..mesh.faces.len())
            .map(|f| if f % 2 == 0 { [1.0, 0.0, 0.0] } else { [0.0, 0.0, 1.0] })
            .collect();
        let parts = [ObjPart {
            name: "terrain",
            mesh: &mesh,
            colors: &colors,
        }];
        let (obj, mtl) = write_obj_mtl(&dir, "planet", &parts, 16, true).unwrap();

        let mtl_text = std::fs::read_to_string(&mtl).unwrap();
        assert_eq!(mtl_text.matches("newmtl ").count(), 2);
        assert!(mtl_text.contains("newmtl mat_ff0000"));

        let obj_text = std::fs::read_to_string(&obj).unwrap();
        assert!(obj_text.starts_with("mtllib planet.mtl"));
        assert_eq!(obj_text.lines().filter(|l| l.starts_with("v ")).count(), 12);
        assert_eq!(obj_text.lines().filter(|l| l.starts_with("f ")).count(), 20);
        assert_eq!(obj_text.matches("usemtl ").count(), 2);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn second_object_indices_are_offset() {
        let dir = std::env::temp_dir().join(format!("tectogen-export-ocean-{}", std::process::id()));
        let terrain = Mesh::icosahedron(1.0);
        let ocean = Mesh::icosahedron(1.0);
        let colors = vec![[0.5, 0.5, 0.5]; terrain.faces.len()];
        let parts = [
            ObjPart { name: "terrain", mesh: &terrain, colors: &colors },
            ObjPart { name: "ocean", mesh: &ocean, colors: &colors },
        ];
        let (obj, _) = write_obj_mtl(&dir, "planet", &parts, 8, false).unwrap();
        let text = std::fs::read_to_string(&obj).unwrap();
        let max_index = text
            .lines()
            .filter(|l| l.starts_with("f "))
            .flat_map(|l| l[2..].split(' ').map(|s| s.parse::<u32>().unwrap()).collect::<Vec<_>>())
            .max()
            .unwrap();
        assert_eq!(max_index, 24);
        std::fs::remove_dir_all(&dir).ok();
    }
}
