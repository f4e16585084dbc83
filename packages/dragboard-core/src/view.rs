/// View derivation: read-only filter and sort over a store snapshot.
///
/// Nothing here mutates the store. Filtering narrows the tasks shown inside a
/// column but never hides a column. Sorting reorders columns with a stable
/// sort, so ties keep their store order.
use std::cmp::Reverse;
use std::collections::HashMap;

use serde::Serialize;

use crate::search::{normalize_for_search, SearchEngine, SearchOptions};
use crate::store::EntityStore;
use crate::types::{Column, ColumnId, SortOption, Task};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewOptions {
    pub query: String,
    pub search: SearchOptions,
    /// `None` keeps store order.
    pub sort: Option<SortOption>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnView<'a> {
    pub column: &'a Column,
    /// All tasks of the column in the store, regardless of the filter.
    pub task_count: usize,
    /// Tasks passing the filter, in store order.
    pub tasks: Vec<&'a Task>,
}

pub fn derive_view<'a>(store: &'a EntityStore, options: &ViewOptions) -> Vec<ColumnView<'a>> {
    let engine = SearchEngine::compile(&options.query, options.search);

    let mut by_column: HashMap<&ColumnId, (usize, Vec<&Task>)> = HashMap::new();
    for task in store.tasks() {
        let entry = by_column.entry(&task.column_id).or_default();
        entry.0 += 1;
        if engine.matches(&task.content) {
            entry.1.push(task);
        }
    }

    let mut views: Vec<ColumnView<'a>> = store
        .columns()
        .iter()
        .map(|column| {
            let (task_count, tasks) = by_column.remove(&column.id).unwrap_or_default();
            ColumnView {
                column,
                task_count,
                tasks,
            }
        })
        .collect();

    if let Some(sort) = options.sort {
        sort_columns(&mut views, sort);
    }
    views
}

/// Stable sort of column views.
pub fn sort_columns(views: &mut [ColumnView<'_>], sort: SortOption) {
    match sort {
        SortOption::TitleAsc => views.sort_by_cached_key(|v| normalize_for_search(&v.column.title)),
        SortOption::TitleDesc => {
            views.sort_by_cached_key(|v| Reverse(normalize_for_search(&v.column.title)))
        }
        SortOption::TaskCountDesc => views.sort_by_key(|v| Reverse(v.task_count)),
        SortOption::TaskCountAsc => views.sort_by_key(|v| v.task_count),
    }
}
