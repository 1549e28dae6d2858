//! Run manifest.
//!
//! Records everything a playback program needs to unpack the outputs: the bit
//! width, how frames map onto output files, and a BLAKE3 hash of each file.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use layerpack_core::png::hash_png;
use layerpack_core::PackSummary;

/// File name of the manifest inside the output directory.
pub const MANIFEST_FILE_NAME: &str = "manifest.json";

/// Description of a packing run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Manifest {
    pub bits_per_layer: u32,
    pub layers_per_image: u32,
    /// Number of packed source images (animation frames).
    pub frame_count: usize,
    pub width: u32,
    pub height: u32,
    pub outputs: Vec<ManifestOutput>,
}

/// One packed output file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ManifestOutput {
    /// File name relative to the output directory.
    pub file: String,
    /// BLAKE3 hash of the file contents.
    pub hash: String,
    /// Layers in layer order.
    pub layers: Vec<ManifestLayer>,
}

/// One layer of an output file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ManifestLayer {
    /// Frame index (position in packing order).
    pub frame: usize,
    /// Source file name.
    pub source: String,
    pub layer: u32,
    /// Bit offset within the pixel integer.
    pub offset: u32,
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

impl Manifest {
    /// Build a manifest from a run summary, hashing the written outputs.
    pub fn from_summary(summary: &PackSummary, sources: &[PathBuf]) -> Result<Self> {
        let outputs = summary
            .outputs
            .iter()
            .map(|record| -> Result<ManifestOutput> {
                let data = fs::read(&record.path)
                    .with_context(|| format!("Failed to read output {}", record.path.display()))?;
                let layers = record
                    .slots
                    .iter()
                    .map(|slot| ManifestLayer {
                        frame: slot.source,
                        source: file_name(&sources[slot.source]),
                        layer: slot.layer,
                        offset: slot.offset,
                    })
                    .collect();

                Ok(ManifestOutput {
                    file: file_name(&record.path),
                    hash: hash_png(&data),
                    layers,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            bits_per_layer: summary.layout.bits_per_layer(),
            layers_per_image: summary.layout.layers_per_image(),
            frame_count: summary.source_count,
            width: summary.width,
            height: summary.height,
            outputs,
        })
    }

    /// Write the manifest as pretty JSON into `out_dir`, returning its path.
    pub fn write(&self, out_dir: &Path) -> Result<PathBuf> {
        let path = out_dir.join(MANIFEST_FILE_NAME);
        let json = serde_json::to_string_pretty(self)?;
        fs::write(&path, json)
            .with_context(|| format!("Failed to write manifest {}", path.display()))?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use layerpack_core::{LayerLayout, OutputRecord};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_manifest_from_summary() {
        let dir = tempfile::tempdir().unwrap();
        let layout = LayerLayout::new(16).unwrap();
        let sources: Vec<PathBuf> = ["in/a.png", "in/b.png", "in/c.png"]
            .iter()
            .map(PathBuf::from)
            .collect();

        let mut outputs = Vec::new();
        for index in 0..2 {
            let path = dir.path().join(format!("output_{index}.png"));
            fs::write(&path, format!("data {index}")).unwrap();
            outputs.push(OutputRecord {
                index,
                path,
                slots: layout.slots_for_output(index, 3).collect(),
            });
        }

        let summary = PackSummary {
            layout,
            width: 4,
            height: 2,
            source_count: 3,
            outputs,
        };

        let manifest = Manifest::from_summary(&summary, &sources).unwrap();
        assert_eq!(manifest.bits_per_layer, 16);
        assert_eq!(manifest.layers_per_image, 2);
        assert_eq!(manifest.frame_count, 3);
        assert_eq!(manifest.outputs[0].file, "output_0.png");
        assert_eq!(manifest.outputs[0].hash, hash_png(b"data 0"));
        assert_eq!(
            manifest.outputs[1].layers,
            vec![ManifestLayer {
                frame: 2,
                source: "c.png".to_string(),
                layer: 0,
                offset: 0,
            }]
        );

        let path = manifest.write(dir.path()).unwrap();
        let parsed: Manifest = serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(parsed, manifest);
    }

    #[test]
    fn test_manifest_missing_output_fails() {
        let dir = tempfile::tempdir().unwrap();
        let layout = LayerLayout::new(8).unwrap();
        let summary = PackSummary {
            layout,
            width: 1,
            height: 1,
            source_count: 1,
            outputs: vec![OutputRecord {
                index: 0,
                path: dir.path().join("output_0.png"),
                slots: layout.slots_for_output(0, 1).collect(),
            }],
        };

        assert!(Manifest::from_summary(&summary, &[PathBuf::from("a.png")]).is_err());
    }
}
