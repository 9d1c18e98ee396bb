use crate::error::{Result, TocError};
use crate::toc::{NodeId, OutlineTree};
use log::{info, warn};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, StringFormat};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};

/// An outline item as found in an existing PDF.
#[derive(Debug, Clone, Serialize)]
pub struct OutlineEntry {
    pub title: String,
    pub page: Option<u32>,
    pub level: u32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<OutlineEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FlatOutlineEntry {
    pub title: String,
    pub page: Option<u32>,
    pub level: u32,
}

/// Read the outline (bookmarks) of a loaded document.
pub fn extract_outline(doc: &Document) -> Result<Vec<OutlineEntry>> {
    let catalog = doc.catalog()?;

    let outlines = match catalog.get(b"Outlines") {
        Ok(Object::Reference(r)) => match doc.get_dictionary(*r) {
            Ok(d) => d,
            Err(_) => return Ok(Vec::new()),
        },
        _ => return Ok(Vec::new()),
    };

    let first = match outlines.get(b"First") {
        Ok(Object::Reference(r)) => *r,
        _ => return Ok(Vec::new()),
    };

    let pages: HashMap<ObjectId, u32> = doc
        .get_pages()
        .into_iter()
        .map(|(num, id)| (id, num))
        .collect();
    let mut seen = HashSet::new();

    Ok(read_siblings(doc, first, &pages, 0, &mut seen))
}

fn read_siblings(
    doc: &Document,
    first: ObjectId,
    pages: &HashMap<ObjectId, u32>,
    level: u32,
    seen: &mut HashSet<ObjectId>,
) -> Vec<OutlineEntry> {
    let mut entries = Vec::new();
    let mut current = Some(first);

    // `seen` guards against /Next or /First cycles in damaged files
    while let Some(id) = current.filter(|id| seen.insert(*id)) {
        let Ok(dict) = doc.get_dictionary(id) else {
            break;
        };

        let title = match dict.get(b"Title") {
            Ok(Object::String(bytes, _)) => decode_text_string(bytes),
            _ => "Untitled".to_string(),
        };

        let children = match dict.get(b"First") {
            Ok(Object::Reference(child)) => read_siblings(doc, *child, pages, level + 1, seen),
            _ => Vec::new(),
        };

        entries.push(OutlineEntry {
            title,
            page: target_page(doc, dict, pages),
            level,
            children,
        });

        current = match dict.get(b"Next") {
            Ok(Object::Reference(r)) => Some(*r),
            _ => None,
        };
    }

    entries
}

fn target_page(doc: &Document, item: &Dictionary, pages: &HashMap<ObjectId, u32>) -> Option<u32> {
    if let Ok(dest) = item.get(b"Dest") {
        return resolve_destination(doc, dest, pages, 0);
    }

    let action = match item.get(b"A").ok()? {
        Object::Reference(r) => doc.get_dictionary(*r).ok()?,
        Object::Dictionary(d) => d,
        _ => return None,
    };
    match action.get(b"S") {
        Ok(Object::Name(kind)) if kind == b"GoTo" => {
            resolve_destination(doc, action.get(b"D").ok()?, pages, 0)
        }
        _ => None,
    }
}

fn resolve_destination(
    doc: &Document,
    dest: &Object,
    pages: &HashMap<ObjectId, u32>,
    hops: u8,
) -> Option<u32> {
    if hops > 8 {
        return None;
    }
    match dest {
        // [page /Fit], [page /XYZ left top zoom], ...
        Object::Array(arr) => match arr.first() {
            Some(Object::Reference(page)) => pages.get(page).copied(),
            _ => None,
        },
        Object::Reference(r) => resolve_destination(doc, doc.get_object(*r).ok()?, pages, hops + 1),
        // /D entry of a destination dictionary
        Object::Dictionary(d) => resolve_destination(doc, d.get(b"D").ok()?, pages, hops + 1),
        Object::String(name, _) | Object::Name(name) => {
            let dest = named_destination(doc, name)?;
            resolve_destination(doc, &dest, pages, hops + 1)
        }
        _ => None,
    }
}

fn named_destination(doc: &Document, name: &[u8]) -> Option<Object> {
    let catalog = doc.catalog().ok()?;

    if let Ok(Object::Reference(names)) = catalog.get(b"Names") {
        if let Ok(Object::Reference(dests)) = doc.get_dictionary(*names).ok()?.get(b"Dests") {
            if let Some(found) = search_name_tree(doc, *dests, name, &mut HashSet::new()) {
                return Some(found);
            }
        }
    }

    // PDF 1.1 style /Dests dictionary
    match catalog.get(b"Dests") {
        Ok(Object::Reference(dests)) => doc.get_dictionary(*dests).ok()?.get(name).ok().cloned(),
        _ => None,
    }
}

fn search_name_tree(
    doc: &Document,
    node: ObjectId,
    name: &[u8],
    seen: &mut HashSet<ObjectId>,
) -> Option<Object> {
    if !seen.insert(node) {
        return None;
    }
    let dict = doc.get_dictionary(node).ok()?;

    if let Ok(Object::Array(names)) = dict.get(b"Names") {
        for pair in names.chunks_exact(2) {
            if matches!(&pair[0], Object::String(key, _) if key == name) {
                return Some(pair[1].clone());
            }
        }
    }

    if let Ok(Object::Array(kids)) = dict.get(b"Kids") {
        for kid in kids {
            if let Object::Reference(kid) = kid {
                if let Some(found) = search_name_tree(doc, *kid, name, seen) {
                    return Some(found);
                }
            }
        }
    }

    None
}

/// Flatten nested outline entries in document order.
pub fn flatten_outline(entries: &[OutlineEntry]) -> Vec<FlatOutlineEntry> {
    let mut result = Vec::new();
    flatten_into(entries, &mut result);
    result
}

fn flatten_into(entries: &[OutlineEntry], result: &mut Vec<FlatOutlineEntry>) {
    for entry in entries {
        result.push(FlatOutlineEntry {
            title: entry.title.clone(),
            page: entry.page,
            level: entry.level,
        });
        flatten_into(&entry.children, result);
    }
}

/// Replace the document outline with `tree`.
///
/// Every item gets a `GoTo` action to its page with a `/Fit` view and is
/// created open. Returns the id of the new `/Outlines` dictionary, or `None`
/// when the tree is empty, in which case any existing outline is removed.
pub fn write_outline(doc: &mut Document, tree: &OutlineTree) -> Result<Option<ObjectId>> {
    let catalog_id = doc.trailer.get(b"Root")?.as_reference()?;

    if tree.is_empty() {
        if doc.get_dictionary_mut(catalog_id)?.remove(b"Outlines").is_some() {
            let pruned = doc.prune_objects();
            warn!(
                "Removed the existing outline ({} unreachable objects removed)",
                pruned.len()
            );
        }
        return Ok(None);
    }

    let pages = doc.get_pages();
    let outlines_id = doc.new_object_id();
    let mut ids = HashMap::with_capacity(tree.len() + 1);
    ids.insert(OutlineTree::ROOT, outlines_id);
    for (_, node) in tree.walk() {
        ids.insert(node, doc.new_object_id());
    }

    write_level(doc, tree, OutlineTree::ROOT, &ids, &pages)?;

    let top = tree.children(OutlineTree::ROOT);
    let mut outlines = dictionary! {
        "Type" => "Outlines",
        "Count" => tree.len() as i64,
    };
    if let (Some(first), Some(last)) = (top.first(), top.last()) {
        outlines.set("First", ids[first]);
        outlines.set("Last", ids[last]);
    }
    doc.objects.insert(outlines_id, Object::Dictionary(outlines));

    let catalog = doc.get_dictionary_mut(catalog_id)?;
    let replaced = catalog.has(b"Outlines");
    catalog.set("Outlines", outlines_id);
    catalog.set("PageMode", "UseOutlines");

    if replaced {
        let pruned = doc.prune_objects();
        warn!(
            "Replaced the existing outline ({} unreachable objects removed)",
            pruned.len()
        );
    }
    info!("Attached outline with {} items", tree.len());

    Ok(Some(outlines_id))
}

fn write_level(
    doc: &mut Document,
    tree: &OutlineTree,
    parent: NodeId,
    ids: &HashMap<NodeId, ObjectId>,
    pages: &BTreeMap<u32, ObjectId>,
) -> Result<()> {
    let siblings = tree.children(parent);

    for (i, &id) in siblings.iter().enumerate() {
        let node = tree.node(id);
        let page_id = *pages
            .get(&node.target_page)
            .ok_or(TocError::InvalidTargetPage {
                page: i64::from(node.target_page),
                page_count: pages.len() as u32,
            })?;

        let mut dict = dictionary! {
            "Title" => encode_text_string(&node.title),
            "Parent" => ids[&node.parent.unwrap_or(OutlineTree::ROOT)],
            "A" => dictionary! {
                "S" => "GoTo",
                "D" => vec![Object::Reference(page_id), "Fit".into()],
            },
        };
        if i > 0 {
            dict.set("Prev", ids[&siblings[i - 1]]);
        }
        if let Some(next) = siblings.get(i + 1) {
            dict.set("Next", ids[next]);
        }

        let children = tree.children(id);
        if let (Some(first), Some(last)) = (children.first(), children.last()) {
            dict.set("First", ids[first]);
            dict.set("Last", ids[last]);
            dict.set("Count", tree.descendant_count(id) as i64);
            write_level(doc, tree, id, ids, pages)?;
        }

        doc.objects.insert(ids[&id], Object::Dictionary(dict));
    }

    Ok(())
}

/// PDF text string: literal for ASCII, UTF-16BE with a byte-order mark otherwise.
fn encode_text_string(text: &str) -> Object {
    if text.is_ascii() {
        return Object::string_literal(text);
    }
    let mut bytes = vec![0xFE, 0xFF];
    for unit in text.encode_utf16() {
        bytes.extend_from_slice(&unit.to_be_bytes());
    }
    Object::String(bytes, StringFormat::Hexadecimal)
}

fn decode_text_string(bytes: &[u8]) -> String {
    match bytes {
        [0xFE, 0xFF, rest @ ..] => {
            let units: Vec<u16> = rest
                .chunks_exact(2)
                .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
                .collect();
            String::from_utf16_lossy(&units)
        }
        // PDFDocEncoding agrees with Latin-1 for printable text
        _ => bytes.iter().map(|&b| b as char).collect(),
    }
}
