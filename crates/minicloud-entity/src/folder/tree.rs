//! In-memory view of one owner's folder forest.
//!
//! [`FolderGraph`] is built from a snapshot of an owner's folders (and,
//! when sizes matter, their files) and answers every structural question
//! the hierarchy needs: cycle checks, sibling-name checks, breadcrumbs, and
//! recursive sizes. All walks are iterative. A graph is built per call and
//! thrown away, so no aggregate outlives the snapshot it was computed from.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use minicloud_core::{AppError, AppResult};

use super::model::Folder;
use crate::file::File;

/// One step of a breadcrumb path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Crumb {
    /// Folder ID.
    pub id: Uuid,
    /// Folder name.
    pub name: String,
}

/// A folder together with its recursive size, as listed by the tree view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FolderNode {
    /// Folder ID.
    pub id: Uuid,
    /// Folder name.
    pub name: String,
    /// Parent folder (`None` for root).
    pub parent_id: Option<Uuid>,
    /// Creation timestamp.
    pub created_at: chrono::DateTime<chrono::Utc>,
    /// Bytes in this folder and every folder below it.
    pub size_bytes: i64,
}

/// Parent/child index over one owner's folders.
#[derive(Debug, Default)]
pub struct FolderGraph {
    folders: HashMap<Uuid, Folder>,
    children: HashMap<Option<Uuid>, Vec<Uuid>>,
    direct_bytes: HashMap<Option<Uuid>, i64>,
    direct_files: HashMap<Option<Uuid>, usize>,
}

impl FolderGraph {
    /// Index a set of folders. Folders are expected to share one owner.
    pub fn new(folders: impl IntoIterator<Item = Folder>) -> Self {
        let mut graph = Self::default();
        for folder in folders {
            graph
                .children
                .entry(folder.parent_id)
                .or_default()
                .push(folder.id);
            graph.folders.insert(folder.id, folder);
        }
        graph
    }

    /// Attach file sizes and counts to their containing folders.
    pub fn with_files<'a>(mut self, files: impl IntoIterator<Item = &'a File>) -> Self {
        for file in files {
            *self.direct_bytes.entry(file.folder_id).or_default() += file.size_bytes;
            *self.direct_files.entry(file.folder_id).or_default() += 1;
        }
        self
    }

    /// Number of folders in the graph.
    pub fn len(&self) -> usize {
        self.folders.len()
    }

    /// Whether the graph holds no folders.
    pub fn is_empty(&self) -> bool {
        self.folders.is_empty()
    }

    /// Look up a folder.
    pub fn get(&self, id: Uuid) -> Option<&Folder> {
        self.folders.get(&id)
    }

    /// Whether the folder is part of this graph.
    pub fn contains(&self, id: Uuid) -> bool {
        self.folders.contains_key(&id)
    }

    /// Direct child folder ids of `parent` (`None` for root level).
    pub fn children_of(&self, parent: Option<Uuid>) -> &[Uuid] {
        self.children.get(&parent).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of files attached directly to `folder`.
    pub fn direct_file_count(&self, folder: Option<Uuid>) -> usize {
        self.direct_files.get(&folder).copied().unwrap_or(0)
    }

    /// Whether the folder has no subfolders and no files.
    pub fn is_empty_folder(&self, id: Uuid) -> bool {
        self.children_of(Some(id)).is_empty() && self.direct_file_count(Some(id)) == 0
    }

    /// Whether a sibling under `parent` already uses `name`.
    ///
    /// `except` excludes the folder being renamed or moved.
    pub fn sibling_name_taken(&self, parent: Option<Uuid>, name: &str, except: Option<Uuid>) -> bool {
        self.children_of(parent).iter().any(|id| {
            Some(*id) != except && self.folders.get(id).is_some_and(|f| f.name == name)
        })
    }

    /// Whether `candidate` is `folder_id` itself or lies below it.
    ///
    /// Walks the candidate's ancestor chain until it reaches the root or
    /// `folder_id`. A chain longer than the folder count means the stored
    /// parents already loop, which is reported as a match.
    pub fn is_self_or_descendant(&self, folder_id: Uuid, candidate: Uuid) -> bool {
        let mut current = Some(candidate);
        let mut steps = 0usize;
        while let Some(id) = current {
            if id == folder_id {
                return true;
            }
            steps += 1;
            if steps > self.folders.len() {
                return true;
            }
            current = self.folders.get(&id).and_then(|f| f.parent_id);
        }
        false
    }

    /// Root-to-leaf path ending at `id`, or `None` if `id` is unknown.
    pub fn breadcrumb(&self, id: Uuid) -> Option<Vec<Crumb>> {
        let start = self.folders.get(&id)?;
        let mut path = Vec::new();
        let mut seen = HashSet::new();
        let mut current = Some(start);
        while let Some(folder) = current {
            if !seen.insert(folder.id) {
                break;
            }
            path.push(Crumb {
                id: folder.id,
                name: folder.name.clone(),
            });
            current = folder.parent_id.and_then(|p| self.folders.get(&p));
        }
        path.reverse();
        Some(path)
    }

    /// Bytes in `id` and all folders below it.
    pub fn subtree_size(&self, id: Uuid) -> i64 {
        let mut total = 0;
        let mut stack = vec![id];
        let mut seen = HashSet::new();
        while let Some(current) = stack.pop() {
            if !seen.insert(current) {
                continue;
            }
            total += self.direct_bytes.get(&Some(current)).copied().unwrap_or(0);
            stack.extend(self.children_of(Some(current)).iter().copied());
        }
        total
    }

    /// Recursive size of every folder, computed in one pass.
    pub fn subtree_sizes(&self) -> HashMap<Uuid, i64> {
        // Pre-order from the roots; walking it backwards visits every child
        // before its parent.
        let mut order = Vec::with_capacity(self.folders.len());
        let mut stack: Vec<Uuid> = self.children_of(None).to_vec();
        let mut seen = HashSet::new();
        while let Some(id) = stack.pop() {
            if !seen.insert(id) {
                continue;
            }
            order.push(id);
            stack.extend(self.children_of(Some(id)).iter().copied());
        }

        let mut sizes: HashMap<Uuid, i64> = self
            .folders
            .keys()
            .map(|id| (*id, self.direct_bytes.get(&Some(*id)).copied().unwrap_or(0)))
            .collect();
        for id in order.iter().rev() {
            let own = sizes.get(id).copied().unwrap_or(0);
            if let Some(parent) = self.folders.get(id).and_then(|f| f.parent_id) {
                if let Some(parent_size) = sizes.get_mut(&parent) {
                    *parent_size += own;
                }
            }
        }
        sizes
    }

    /// Validate creating `name` under `parent`.
    pub fn check_create(&self, parent: Option<Uuid>, name: &str) -> AppResult<()> {
        if let Some(parent_id) = parent {
            if !self.contains(parent_id) {
                return Err(AppError::not_found("Parent folder not found"));
            }
        }
        if self.sibling_name_taken(parent, name, None) {
            return Err(AppError::conflict(format!(
                "A folder named '{name}' already exists in this location"
            )));
        }
        Ok(())
    }

    /// Validate reparenting `folder_id` under `new_parent`.
    pub fn check_move(&self, folder_id: Uuid, new_parent: Option<Uuid>) -> AppResult<&Folder> {
        let folder = self
            .get(folder_id)
            .ok_or_else(|| AppError::not_found("Folder not found"))?;
        if let Some(target) = new_parent {
            if !self.contains(target) {
                return Err(AppError::not_found("Target folder not found"));
            }
            if self.is_self_or_descendant(folder_id, target) {
                return Err(AppError::invalid_operation(
                    "Cannot move a folder into itself or one of its subfolders",
                ));
            }
        }
        if self.sibling_name_taken(new_parent, &folder.name, Some(folder_id)) {
            return Err(AppError::conflict(format!(
                "A folder named '{}' already exists in the target location",
                folder.name
            )));
        }
        Ok(folder)
    }

    /// Validate deleting `folder_id`. Requires a graph built with files.
    pub fn check_delete(&self, folder_id: Uuid) -> AppResult<()> {
        if !self.contains(folder_id) {
            return Err(AppError::not_found("Folder not found"));
        }
        if !self.is_empty_folder(folder_id) {
            return Err(AppError::not_empty(
                "Folder is not empty. Delete its files and subfolders first",
            ));
        }
        Ok(())
    }

    /// Every folder with its recursive size, ordered by name.
    pub fn nodes(&self) -> Vec<FolderNode> {
        let sizes = self.subtree_sizes();
        let mut nodes: Vec<FolderNode> = self
            .folders
            .values()
            .map(|f| FolderNode {
                id: f.id,
                name: f.name.clone(),
                parent_id: f.parent_id,
                created_at: f.created_at,
                size_bytes: sizes.get(&f.id).copied().unwrap_or(0),
            })
            .collect();
        nodes.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        nodes
    }
}
