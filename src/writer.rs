use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::info;
use crate::error::Result;
use crate::morph::MorphRecord;


/// `morphdata_<id>.json` for the figure reference key `#<id>`.
pub fn output_file_name(figure_key: &str) -> String {
    let id = figure_key.strip_prefix('#').unwrap_or(figure_key);
    let id = id.replace(|c: char| c == '/' || c == '\\', "_");
    format!("morphdata_{}.json", id)
}

pub fn to_json(records: &[MorphRecord]) -> Result<Vec<u8>> {
    serde_json::to_vec_pretty(records).map_err(|e| io::Error::from(e).into())
}

/// Write `records` into `dir`, replacing any existing file.  Returns the path written.
pub fn write(dir: impl AsRef<Path>, figure_key: &str, records: &[MorphRecord]) -> Result<PathBuf> {
    let path = dir.as_ref().join(output_file_name(figure_key));
    fs::write(&path, to_json(records)?)?;
    info!("created morph data file: {}", path.display());
    Ok(path)
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_file_name() {
        assert_eq!(output_file_name("#Genesis8Female"), "morphdata_Genesis8Female.json");
        assert_eq!(output_file_name("#Genesis 8 Male-1"), "morphdata_Genesis 8 Male-1.json");
        assert_eq!(output_file_name("#a/b"), "morphdata_a_b.json");
        assert_eq!(output_file_name("plain"), "morphdata_plain.json");
    }

    #[test]
    fn test_to_json() {
        let records = vec![MorphRecord {
            id: "FBMHeavy".to_owned(),
            url: "/data/Morphs/FBMHeavy.dsf".to_owned(),
            value: 0.5,
        }];
        let text = String::from_utf8(to_json(&records).unwrap()).unwrap();
        assert_eq!(text, concat!(
            "[\n",
            "  {\n",
            "    \"id\": \"FBMHeavy\",\n",
            "    \"url\": \"/data/Morphs/FBMHeavy.dsf\",\n",
            "    \"value\": 0.5\n",
            "  }\n",
            "]",
        ));
        assert_eq!(to_json(&[]).unwrap(), b"[]");
    }
}
