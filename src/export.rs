use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::info;
use crate::dson;
use crate::error::{Error, Result};
use crate::loader::{self, LoadOptions};
use crate::morph::{self, Resolution};
use crate::writer;


#[derive(Clone, Debug, Default)]
pub struct ExportOptions {
    pub load: LoadOptions,
    /// Where the `morphdata_*.json` files go.  Defaults to the input file's directory.
    pub output_dir: Option<PathBuf>,
}

#[derive(Debug)]
pub struct Export {
    pub resolution: Resolution,
    /// One file per figure, in figure order.
    pub written: Vec<PathBuf>,
}

pub fn output_dir_for(input: &Path, opts: &ExportOptions) -> PathBuf {
    if let Some(ref dir) = opts.output_dir {
        return dir.clone();
    }
    match input.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_owned(),
        _ => PathBuf::from("."),
    }
}

/// Distinct figure keys can map to one file name once separators are replaced.
fn check_output_names(resolution: &Resolution) -> Result<()> {
    let mut seen = HashMap::new();
    for figure in &resolution.figures {
        let name = writer::output_file_name(&figure.key);
        if let Some(other) = seen.insert(name, &figure.key) {
            return Err(Error::Data(format!(
                "figures {:?} and {:?} would both write {}",
                other, figure.key, writer::output_file_name(&figure.key),
            )));
        }
    }
    Ok(())
}

/// Load `input`, resolve its morphs, and write one file per figure.  Nothing is
/// written unless the whole document resolves.
pub fn export_morphs(input: impl AsRef<Path>, opts: &ExportOptions) -> Result<Export> {
    let input = input.as_ref();
    let text = loader::load(input, &opts.load)?;
    let doc = dson::parse(&text)?;
    let resolution = morph::resolve(&doc)?;
    info!("resolved {} morphs across {} figures",
        resolution.morph_count(), resolution.figures.len());

    check_output_names(&resolution)?;
    let dir = output_dir_for(input, opts);
    let mut written = Vec::with_capacity(resolution.figures.len());
    for figure in &resolution.figures {
        written.push(writer::write(&dir, &figure.key, &figure.morphs)?);
    }

    Ok(Export { resolution, written })
}
