//! Resolve command-line references to graph ids
//!
//! Parameters are given by id or slug, options by id or label.

use crate::error::CliError;
use tpg_graph::{GraphStore, OptionId, ParameterId, Selection};

/// Resolve a parameter id or slug
pub fn parameter(graph: &GraphStore, reference: &str) -> Result<ParameterId, CliError> {
    let by_id = reference
        .parse::<ParameterId>()
        .ok()
        .filter(|id| graph.parameter(*id).is_some());

    by_id
        .or_else(|| graph.find_parameter_by_slug(reference).map(|p| p.id))
        .ok_or_else(|| CliError::UnknownParameter(reference.to_string()))
}

/// Resolve an option id or label of `parameter`
pub fn option(
    graph: &GraphStore,
    parameter: ParameterId,
    reference: &str,
) -> Result<OptionId, CliError> {
    let by_id = reference
        .parse::<OptionId>()
        .ok()
        .filter(|id| graph.option(*id).is_some_and(|o| o.parameter_id == parameter));

    by_id
        .or_else(|| graph.find_option_by_label(parameter, reference).map(|o| o.id))
        .ok_or_else(|| CliError::UnknownOption {
            parameter: parameter.to_string(),
            option: reference.to_string(),
        })
}

/// Build a selection from `parameter=option` pairs
///
/// A later pair for the same parameter replaces an earlier one.
pub fn selection<'a>(
    graph: &GraphStore,
    picks: impl IntoIterator<Item = &'a str>,
) -> Result<Selection, CliError> {
    let mut selection = Selection::new();
    for pick in picks {
        let (param_ref, option_ref) = pick
            .split_once('=')
            .map(|(p, o)| (p.trim(), o.trim()))
            .filter(|(p, o)| !p.is_empty() && !o.is_empty())
            .ok_or_else(|| CliError::MalformedSelection(pick.to_string()))?;

        let param = parameter(graph, param_ref)?;
        let chosen = option(graph, param, option_ref).map_err(|_| CliError::UnknownOption {
            parameter: param_ref.to_string(),
            option: option_ref.to_string(),
        })?;
        selection.insert(param, chosen);
    }
    Ok(selection)
}
