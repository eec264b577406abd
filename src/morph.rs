//! Pairing of morph modifiers with the figures they deform.
//!
//! Modifiers in `scene.modifiers` name their parent by reference key (`"#" + id`).
//! The parent is either a figure node or one of the figure's geometries, so a
//! figure and geometry lookup is built from `scene.nodes` before the modifiers are
//! walked.
use std::collections::hash_map::{HashMap, Entry};
use serde::Serialize;
use tracing::{debug, info, warn};
use crate::dson::DsonNode;
use crate::error::{Error, Result};


#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MorphRecord {
    pub id: String,
    /// Source asset path with the common escapes decoded and the `#fragment` removed.
    pub url: String,
    pub value: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FigureMorphs {
    /// Reference key, `"#" + id`.
    pub key: String,
    pub name: String,
    /// Morphs in `scene.modifiers` order.
    pub morphs: Vec<MorphRecord>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Resolution {
    /// One entry per figure node, in `scene.nodes` order.
    pub figures: Vec<FigureMorphs>,
    /// Modifiers whose parent matched neither a figure nor a geometry.
    pub unresolved: Vec<Unresolved>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Unresolved {
    /// Position in `scene.modifiers`.
    pub index: usize,
    /// `None` when the modifier has no string `parent` at all.
    pub parent: Option<String>,
}

impl Resolution {
    pub fn figure(&self, key: &str) -> Option<&FigureMorphs> {
        self.figures.iter().find(|f| f.key == key)
    }

    pub fn morph_count(&self) -> usize {
        self.figures.iter().map(|f| f.morphs.len()).sum()
    }
}


pub fn reference_key(id: &str) -> String {
    format!("#{}", id)
}

pub fn decode_url(url: &str) -> String {
    let url = url.replace("%20", " ").replace("%28", "(").replace("%29", ")");
    match url.find('#') {
        Some(i) => url[.. i].to_owned(),
        None => url,
    }
}

fn required_str<'a, N: DsonNode>(
    node: &'a N,
    path: &str,
    what: &str,
    index: usize,
) -> Result<&'a str> {
    node.get_str(path).ok_or_else(|| {
        Error::Data(format!("{} {}: missing string field `{}`", what, index, path))
    })
}


pub fn resolve<N: DsonNode>(doc: &N) -> Result<Resolution> {
    let mut figures = Vec::new();
    // Both map a reference key to an index into `figures`.
    let mut figure_keys = HashMap::new();
    let mut geometry_keys = HashMap::new();

    for (i, node) in doc.children("scene.nodes").iter().enumerate() {
        if node.get_str("preview.type") != Some("figure") {
            continue;
        }
        let id = required_str(node, "id", "node", i)?;
        let key = reference_key(id);
        let name = node.get_str("name").unwrap_or(id).to_owned();
        info!("found figure: {}", name);

        let figure_idx = figures.len();
        match figure_keys.entry(key.clone()) {
            Entry::Vacant(e) => { e.insert(figure_idx); },
            Entry::Occupied(_) => {
                return Err(Error::Data(format!("duplicate figure id {:?}", id)));
            },
        }

        let geometries = node.children("geometries");
        debug!("found {} geometries for figure {:?}", geometries.len(), id);
        for (j, geo) in geometries.iter().enumerate() {
            let geo_id = required_str(geo, "id", "geometry", j)?;
            match geometry_keys.entry(reference_key(geo_id)) {
                Entry::Vacant(e) => { e.insert(figure_idx); },
                Entry::Occupied(_) => {
                    return Err(Error::Data(format!("duplicate geometry id {:?}", geo_id)));
                },
            }
        }

        figures.push(FigureMorphs { key, name, morphs: Vec::new() });
    }

    let mut unresolved = Vec::new();
    for (i, modifier) in doc.children("scene.modifiers").iter().enumerate() {
        let parent = modifier.get_str("parent");
        let found = parent.and_then(|p| figure_keys.get(p).or_else(|| geometry_keys.get(p)));
        let figure_idx = match found {
            Some(&idx) => idx,
            None => {
                match parent {
                    Some(p) => warn!("unable to find parent {:?}, skipping modifier {}", p, i),
                    None => warn!("modifier {} has no parent, skipping", i),
                }
                unresolved.push(Unresolved { index: i, parent: parent.map(str::to_owned) });
                continue;
            },
        };

        // Modifiers without a scalar value (pose controls, etc.) are not morphs.
        let value = match modifier.get_f32("channel.current_value") {
            Some(x) => x,
            None => {
                if modifier.query("channel.current_value").is_some() {
                    debug!("modifier {}: current_value is not a scalar, skipping", i);
                }
                continue;
            },
        };

        let id = required_str(modifier, "id", "modifier", i)?;
        let url = required_str(modifier, "url", "modifier", i)?;
        let figure = &mut figures[figure_idx];
        debug!("found morph for figure {:?}: {}", figure.name, id);
        figure.morphs.push(MorphRecord {
            id: id.to_owned(),
            url: decode_url(url),
            value,
        });
    }

    Ok(Resolution { figures, unresolved })
}
