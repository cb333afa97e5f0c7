//! Category narrowing and selection over a module list.
//!
//! Functions accept anything that borrows a [`Module`], so they work on owned
//! catalogs and on slices of references alike, and always keep input order.

use std::borrow::Borrow;

use crate::model::entity::{CategoryFilter, Module};

/// Modules of the selected category, in input order.
pub fn filter_by_category<I, M>(modules: I, filter: &CategoryFilter) -> Vec<M>
where
    I: IntoIterator<Item = M>,
    M: Borrow<Module>,
{
    modules
        .into_iter()
        .filter(|m| filter.matches(m.borrow().category()))
        .collect()
}

/// Most popular module of the selected category.
///
/// Ties keep the first module in input order. `None` for an empty category.
pub fn featured_for_category<I, M>(modules: I, filter: &CategoryFilter) -> Option<M>
where
    I: IntoIterator<Item = M>,
    M: Borrow<Module>,
{
    modules
        .into_iter()
        .filter(|m| filter.matches(m.borrow().category()))
        .fold(None, |best: Option<M>, candidate| match best {
            Some(best) if best.borrow().users() >= candidate.borrow().users() => Some(best),
            _ => Some(candidate),
        })
}

/// Modules whose title contains `query`, ignoring case. A blank query
/// matches everything.
pub fn search_by_title<I, M>(modules: I, query: &str) -> Vec<M>
where
    I: IntoIterator<Item = M>,
    M: Borrow<Module>,
{
    let needle = query.trim().to_lowercase();
    modules
        .into_iter()
        .filter(|m| needle.is_empty() || m.borrow().title().to_lowercase().contains(&needle))
        .collect()
}
