use boardkit_core::tree::{
    assemble, children_of, contains_uid, index_by_parent, normalize_collection, EntityKind,
    ParentIndex, TreeNode,
};

use super::{RequestExecutor, RequestSpec, Transport};
use crate::error::{ApiError, Error};

/// Fetch spaces, folders and documents concurrently and index them by parent.
///
/// The first failing fetch is returned and the remaining ones are dropped.
pub async fn fetch_index<T: Transport>(
    executor: &RequestExecutor<T>,
) -> Result<ParentIndex, ApiError> {
    let spaces = RequestSpec::get(EntityKind::Space.collection_path());
    let folders = RequestSpec::get(EntityKind::Folder.collection_path());
    let documents = RequestSpec::get(EntityKind::Document.collection_path());

    let (spaces, folders, documents) = tokio::try_join!(
        executor.execute(&spaces),
        executor.execute(&folders),
        executor.execute(&documents)
    )?;

    let entities = normalize_collection(EntityKind::Space, spaces.as_ref())
        .into_iter()
        .chain(normalize_collection(EntityKind::Folder, folders.as_ref()))
        .chain(normalize_collection(EntityKind::Document, documents.as_ref()));

    Ok(index_by_parent(entities))
}

/// Nested tree below `root_uid` (the top level when `None`).
///
/// `max_depth == 0` means unlimited. Fails with [`Error::NotFound`] when `root_uid`
/// is not among the fetched entities.
pub async fn build_tree<T: Transport>(
    executor: &RequestExecutor<T>,
    root_uid: Option<&str>,
    max_depth: usize,
) -> Result<Vec<TreeNode>, Error> {
    let index = fetch_index(executor).await?;

    if let Some(root) = root_uid {
        if !contains_uid(&index, root) {
            return Err(Error::NotFound(root.to_string()));
        }
    }

    let assembly = assemble(&index, root_uid, max_depth);
    for uid in &assembly.cycles {
        log::warn!("Parent cycle detected at {uid}, subtree cut");
    }

    Ok(assembly.nodes)
}

/// Direct children of `parent_uid` (top-level entities when `None`)
pub async fn list_children<T: Transport>(
    executor: &RequestExecutor<T>,
    parent_uid: Option<&str>,
) -> Result<Vec<TreeNode>, Error> {
    let index = fetch_index(executor).await?;
    Ok(children_of(&index, parent_uid))
}
