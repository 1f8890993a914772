//! Folder-tree aggregation
//!
//! Folds the flat record list into a rooted folder tree and rolls metrics up
//! bottom-up: counts and sizes are summed, staleness and coverage are
//! averaged over direct children (files and folders weighted equally —
//! deliberately unweighted by subtree size), and ownership collapses to the
//! shared owner, "Mixed", or "Unassigned".

use crate::analysis::history::round2;
use crate::analysis::ownership::UNASSIGNED_OWNER;
use crate::collector::FileRecord;
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};

/// Display path of the tree root; never joined into child paths.
pub const ROOT_PATH: &str = ".";

/// Owner of a folder whose children disagree.
pub const MIXED_OWNER: &str = "Mixed";

/// Metrics snapshot attached to every node. For files it is copied from the
/// record; for folders it is the aggregate of the direct children. The list
/// fields and history details are retained at file granularity only.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Metrics {
    pub line_count: u64,
    pub size_bytes: u64,
    pub type_count: u64,
    pub include_count: u64,
    pub included_by_count: u64,
    pub staleness_score: f64,
    pub coverage: f64,
    pub misra_critical: u64,
    pub misra_medium: u64,
    pub owner: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub declared_types: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub declared_includes: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub included_by: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recent_change_count: Option<u32>,
}

impl Default for Metrics {
    fn default() -> Self {
        Self {
            line_count: 0,
            size_bytes: 0,
            type_count: 0,
            include_count: 0,
            included_by_count: 0,
            staleness_score: 0.0,
            coverage: 0.0,
            misra_critical: 0,
            misra_medium: 0,
            owner: UNASSIGNED_OWNER.to_string(),
            declared_types: None,
            declared_includes: None,
            included_by: None,
            last_author: None,
            recent_change_count: None,
        }
    }
}

impl Metrics {
    fn from_record(record: &FileRecord) -> Self {
        let history = record.history.clone().unwrap_or_default();
        Self {
            line_count: record.line_count as u64,
            size_bytes: record.size_bytes,
            type_count: record.declared_types.len() as u64,
            include_count: record.declared_includes.len() as u64,
            included_by_count: record.included_by.len() as u64,
            staleness_score: history.staleness_score,
            coverage: record.external.coverage,
            misra_critical: record.external.misra_critical as u64,
            misra_medium: record.external.misra_medium as u64,
            owner: record.owner.clone(),
            declared_types: Some(record.declared_types.clone()),
            declared_includes: Some(record.declared_includes.clone()),
            included_by: Some(record.included_by.clone()),
            last_author: Some(history.last_author),
            recent_change_count: Some(history.recent_change_count),
        }
    }
}

/// A node of the report tree.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TreeNode {
    File(FileNode),
    Folder(FolderNode),
}

impl TreeNode {
    pub fn name(&self) -> &str {
        match self {
            TreeNode::File(file) => &file.name,
            TreeNode::Folder(folder) => &folder.name,
        }
    }

    pub fn metrics(&self) -> &Metrics {
        match self {
            TreeNode::File(file) => &file.metrics,
            TreeNode::Folder(folder) => &folder.metrics,
        }
    }

    fn is_file(&self) -> bool {
        matches!(self, TreeNode::File(_))
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileNode {
    pub name: String,
    pub relative_path: String,
    pub absolute_path: PathBuf,
    pub metrics: Metrics,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderNode {
    pub name: String,
    pub relative_path: String,
    pub absolute_path: PathBuf,
    pub children: Vec<TreeNode>,
    pub metrics: Metrics,
}

/// Segment-keyed folder under construction. The map exists only while the
/// tree is being built; `finish` replaces it with owned, ordered children.
struct FolderBuilder {
    name: String,
    relative_path: String,
    absolute_path: PathBuf,
    children: HashMap<String, BuildNode>,
}

enum BuildNode {
    File(FileNode),
    Folder(FolderBuilder),
}

impl FolderBuilder {
    fn new(name: &str, relative_path: String, absolute_path: PathBuf) -> Self {
        Self {
            name: name.to_string(),
            relative_path,
            absolute_path,
            children: HashMap::new(),
        }
    }

    fn finish(self) -> FolderNode {
        let mut children: Vec<TreeNode> = self
            .children
            .into_values()
            .map(|child| match child {
                BuildNode::File(file) => TreeNode::File(file),
                BuildNode::Folder(folder) => TreeNode::Folder(folder.finish()),
            })
            .collect();
        // Deterministic shape regardless of insertion order: folders first,
        // then alphabetical within each group.
        children.sort_by(|a, b| {
            a.is_file()
                .cmp(&b.is_file())
                .then_with(|| a.name().cmp(b.name()))
        });

        FolderNode {
            name: self.name,
            relative_path: self.relative_path,
            absolute_path: self.absolute_path,
            children,
            metrics: Metrics::default(),
        }
    }
}

/// Build the aggregated report tree for a record set.
pub fn build_report_tree(records: &[FileRecord], repo_root: &Path) -> FolderNode {
    let mut root = build_tree(records, repo_root);
    aggregate_folder(&mut root);
    root
}

fn build_tree(records: &[FileRecord], repo_root: &Path) -> FolderNode {
    let mut root = FolderBuilder::new("Root", ROOT_PATH.to_string(), repo_root.to_path_buf());

    'records: for record in records {
        let segments: Vec<&str> = record.relative_path.split('/').collect();
        let (file_name, folders) = match segments.split_last() {
            Some(split) => split,
            None => continue,
        };

        let mut current = &mut root;
        for part in folders {
            let child_rel = if current.relative_path == ROOT_PATH {
                (*part).to_string()
            } else {
                format!("{}/{}", current.relative_path, part)
            };
            let child_abs = current.absolute_path.join(part);

            current = match current
                .children
                .entry((*part).to_string())
                .or_insert_with(|| BuildNode::Folder(FolderBuilder::new(part, child_rel, child_abs)))
            {
                BuildNode::Folder(folder) => folder,
                // A file record already occupies this segment name; the
                // filesystem cannot produce this, so drop the record.
                BuildNode::File(_) => continue 'records,
            };
        }

        current.children.insert(
            (*file_name).to_string(),
            BuildNode::File(FileNode {
                name: (*file_name).to_string(),
                relative_path: record.relative_path.clone(),
                absolute_path: record.absolute_path.clone(),
                metrics: Metrics::from_record(record),
            }),
        );
    }

    root.finish()
}

/// Post-order merge: every folder's metrics become the roll-up of its direct
/// children's already-resolved metrics.
fn aggregate_folder(folder: &mut FolderNode) {
    for child in &mut folder.children {
        if let TreeNode::Folder(sub) = child {
            aggregate_folder(sub);
        }
    }

    let mut totals = Metrics::default();
    let mut staleness_sum = 0.0;
    let mut coverage_sum = 0.0;
    let mut owners: BTreeSet<String> = BTreeSet::new();
    let count = folder.children.len();

    for child in &folder.children {
        let metrics = child.metrics();
        totals.line_count += metrics.line_count;
        totals.size_bytes += metrics.size_bytes;
        totals.type_count += metrics.type_count;
        totals.include_count += metrics.include_count;
        totals.included_by_count += metrics.included_by_count;
        totals.misra_critical += metrics.misra_critical;
        totals.misra_medium += metrics.misra_medium;
        staleness_sum += metrics.staleness_score;
        coverage_sum += metrics.coverage;
        owners.insert(metrics.owner.clone());
    }

    if count > 0 {
        // Unweighted by design: a subfolder and a single file count equally.
        totals.staleness_score = round2(staleness_sum / count as f64);
        totals.coverage = round2(coverage_sum / count as f64);
    }

    totals.owner = match owners.len() {
        0 => UNASSIGNED_OWNER.to_string(),
        1 => owners
            .pop_first()
            .unwrap_or_else(|| UNASSIGNED_OWNER.to_string()),
        _ => MIXED_OWNER.to_string(),
    };

    folder.metrics = totals;
}
