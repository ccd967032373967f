//! URL tree creation from navigation command lists.
//!
//! A command list describes a navigation relative to an activated route:
//! path atoms, matrix-parameter maps applying to the preceding atom, and
//! an outlets directive that fans out into named outlets. Leading `/`
//! makes the navigation absolute, `..` pops one path index, `.` is a
//! no-op.

use super::tree::{UrlSegment, UrlSegmentGroup, UrlTree, PRIMARY_OUTLET};
use crate::errors::RouterError;
use crate::params::{params_shallow_eq, ParamMap, QueryParams};
use crate::state::ActivatedRouteSnapshot;
use std::sync::Arc;

/// One element of a navigation command list.
#[derive(Debug, Clone)]
pub enum Command {
    /// A path atom. The first atom of a list may carry `/`-separated
    /// parts, a leading `/` (absolute), `..` and `.`.
    Path(String),
    /// Matrix parameters for the preceding path atom (or, as the first
    /// command, for the segment at the starting position).
    Params(ParamMap),
    /// Fan-out into named outlets; must be the last command. A `None`
    /// command list removes the outlet.
    Outlets(Vec<(String, Option<Vec<Command>>)>),
}

impl Command {
    pub fn path(p: impl Into<String>) -> Self {
        Command::Path(p.into())
    }

    pub fn params<K: Into<String>, V: Into<String>>(
        pairs: impl IntoIterator<Item = (K, V)>,
    ) -> Self {
        Command::Params(ParamMap::from_pairs(pairs))
    }

    pub fn outlets(entries: Vec<(String, Option<Vec<Command>>)>) -> Self {
        Command::Outlets(entries)
    }
}

impl From<&str> for Command {
    fn from(s: &str) -> Self {
        Command::Path(s.to_string())
    }
}

impl From<String> for Command {
    fn from(s: String) -> Self {
        Command::Path(s)
    }
}

impl From<i64> for Command {
    fn from(n: i64) -> Self {
        Command::Path(n.to_string())
    }
}

impl From<i32> for Command {
    fn from(n: i32) -> Self {
        Command::Path(n.to_string())
    }
}

/// Apply a command list to `current`, starting from `relative_to` (or the
/// tree root when absent), and assemble a new tree with the given query
/// params and fragment.
pub fn create_url_tree(
    relative_to: Option<&ActivatedRouteSnapshot>,
    current: &UrlTree,
    commands: &[Command],
    query_params: QueryParams,
    fragment: Option<String>,
) -> Result<UrlTree, RouterError> {
    if commands.is_empty() {
        return Ok(assemble(
            &current.root,
            Arc::clone(&current.root),
            current,
            query_params,
            fragment,
        ));
    }

    let nav = Navigation::compute(commands)?;
    if nav.to_root {
        return Ok(assemble(
            &current.root,
            UrlSegmentGroup::empty(),
            current,
            query_params,
            fragment,
        ));
    }

    let position = find_starting_position(&nav, current, relative_to)?;
    let new_group = if position.process_children {
        update_segment_group_children(&position.group, position.index, &nav.commands)?
    } else {
        update_segment_group(Some(Arc::clone(&position.group)), position.index, &nav.commands)?
    };
    Ok(assemble(&position.group, new_group, current, query_params, fragment))
}

struct Navigation {
    is_absolute: bool,
    double_dots: usize,
    to_root: bool,
    commands: Vec<Command>,
}

impl Navigation {
    fn compute(commands: &[Command]) -> Result<Self, RouterError> {
        if commands.len() == 1 {
            if let Command::Path(p) = &commands[0] {
                if p == "/" {
                    return Ok(Navigation {
                        is_absolute: true,
                        double_dots: 0,
                        to_root: true,
                        commands: Vec::new(),
                    });
                }
            }
        }

        let mut is_absolute = false;
        let mut double_dots = 0;
        let mut normalized: Vec<Command> = Vec::with_capacity(commands.len());
        for (idx, command) in commands.iter().enumerate() {
            match command {
                Command::Path(s) if idx == 0 => {
                    for (part_idx, part) in s.split('/').enumerate() {
                        if part_idx == 0 && part == "." {
                            // './a' is explicitly relative, nothing to record
                        } else if part_idx == 0 && part.is_empty() {
                            is_absolute = true;
                        } else if part == ".." {
                            double_dots += 1;
                        } else if !part.is_empty() {
                            normalized.push(Command::Path(part.to_string()));
                        }
                    }
                }
                other => normalized.push(other.clone()),
            }
        }

        if is_absolute {
            if let Some(Command::Params(_)) = normalized.first() {
                return Err(RouterError::InvalidCommand {
                    message: "root segment cannot have matrix parameters".to_string(),
                });
            }
        }
        let outlet_position = normalized
            .iter()
            .position(|c| matches!(c, Command::Outlets(_)));
        if let Some(pos) = outlet_position {
            if pos != normalized.len() - 1 {
                return Err(RouterError::InvalidCommand {
                    message: "an outlets command has to be the last command".to_string(),
                });
            }
        }

        Ok(Navigation {
            is_absolute,
            double_dots,
            to_root: false,
            commands: normalized,
        })
    }
}

struct Position {
    group: Arc<UrlSegmentGroup>,
    process_children: bool,
    index: usize,
}

fn find_starting_position(
    nav: &Navigation,
    tree: &UrlTree,
    route: Option<&ActivatedRouteSnapshot>,
) -> Result<Position, RouterError> {
    if nav.is_absolute {
        return Ok(Position {
            group: Arc::clone(&tree.root),
            process_children: true,
            index: 0,
        });
    }
    let Some(route) = route else {
        return Ok(Position {
            group: Arc::clone(&tree.root),
            process_children: true,
            index: 0,
        });
    };

    if route.last_path_index() == -1 {
        let group = route.url_segment_group();
        let process_children = Arc::ptr_eq(&group, &tree.root);
        return Ok(Position {
            group,
            process_children,
            index: 0,
        });
    }

    let modifier = match nav.commands.first() {
        Some(Command::Params(_)) => 0,
        _ => 1,
    };
    let index = (route.last_path_index() + modifier) as usize;
    apply_double_dots(route.url_segment_group(), index, nav.double_dots)
}

fn apply_double_dots(
    group: Arc<UrlSegmentGroup>,
    index: usize,
    double_dots: usize,
) -> Result<Position, RouterError> {
    let mut group = group;
    let mut current_index = index;
    let mut remaining = double_dots;
    while remaining > current_index {
        remaining -= current_index;
        group = group.parent().ok_or_else(|| RouterError::InvalidCommand {
            message: "invalid number of '../'".to_string(),
        })?;
        current_index = group.segments.len();
    }
    Ok(Position {
        group,
        process_children: false,
        index: current_index - remaining,
    })
}

fn update_segment_group(
    group: Option<Arc<UrlSegmentGroup>>,
    start_index: usize,
    commands: &[Command],
) -> Result<Arc<UrlSegmentGroup>, RouterError> {
    let group = group.unwrap_or_else(UrlSegmentGroup::empty);
    if group.segments.is_empty() && group.has_children() {
        return update_segment_group_children(&group, start_index, commands);
    }

    let prefix = prefixed_with(&group, start_index, commands);
    let sliced = &commands[prefix.command_index..];

    if prefix.matched && prefix.path_index < group.segments.len() {
        // Partial match: the matched prefix keeps the existing children,
        // the remainder hangs off a synthetic primary child.
        let tail = UrlSegmentGroup::new(
            group.segments[prefix.path_index..].to_vec(),
            children_vec(&group),
        );
        let g = UrlSegmentGroup::new(
            group.segments[..prefix.path_index].to_vec(),
            vec![(PRIMARY_OUTLET.to_string(), tail)],
        );
        update_segment_group_children(&g, 0, sliced)
    } else if prefix.matched && sliced.is_empty() {
        Ok(UrlSegmentGroup::new(group.segments.clone(), Vec::new()))
    } else if prefix.matched && !group.has_children() {
        create_new_segment_group(&group, start_index, commands)
    } else if prefix.matched {
        update_segment_group_children(&group, 0, sliced)
    } else {
        create_new_segment_group(&group, start_index, commands)
    }
}

fn update_segment_group_children(
    group: &Arc<UrlSegmentGroup>,
    start_index: usize,
    commands: &[Command],
) -> Result<Arc<UrlSegmentGroup>, RouterError> {
    if commands.is_empty() {
        return Ok(UrlSegmentGroup::new(group.segments.clone(), Vec::new()));
    }

    let outlets = get_outlets(commands);
    let mut children: Vec<(String, Arc<UrlSegmentGroup>)> = Vec::new();
    for (outlet, outlet_commands) in &outlets {
        if let Some(outlet_commands) = outlet_commands {
            let child = update_segment_group(
                group.child(outlet).cloned(),
                start_index,
                outlet_commands,
            )?;
            children.push((outlet.clone(), child));
        }
        // A `None` command list removes the outlet.
    }
    for (name, child) in group.children() {
        if !outlets.iter().any(|(outlet, _)| outlet == name) {
            children.push((name.to_string(), Arc::clone(child)));
        }
    }
    Ok(UrlSegmentGroup::new(group.segments.clone(), children))
}

fn get_outlets(commands: &[Command]) -> Vec<(String, Option<Vec<Command>>)> {
    if let Some(Command::Outlets(outlets)) = commands.first() {
        outlets.clone()
    } else {
        vec![(PRIMARY_OUTLET.to_string(), Some(commands.to_vec()))]
    }
}

struct Prefix {
    matched: bool,
    path_index: usize,
    command_index: usize,
}

const NO_MATCH: Prefix = Prefix {
    matched: false,
    path_index: 0,
    command_index: 0,
};

fn prefixed_with(group: &UrlSegmentGroup, start_index: usize, commands: &[Command]) -> Prefix {
    let mut command_index = 0;
    let mut path_index = start_index;

    while path_index < group.segments.len() {
        if command_index >= commands.len() {
            return NO_MATCH;
        }
        let segment = &group.segments[path_index];
        let current = match &commands[command_index] {
            Command::Path(p) => p,
            // An outlets command stops prefixing; what matched so far stands.
            Command::Outlets(_) => break,
            Command::Params(_) => return NO_MATCH,
        };
        match commands.get(command_index + 1) {
            Some(Command::Params(params)) => {
                if current != &segment.path || !params_shallow_eq(params, &segment.parameters) {
                    return NO_MATCH;
                }
                command_index += 2;
            }
            _ => {
                if current != &segment.path || !segment.parameters.is_empty() {
                    return NO_MATCH;
                }
                command_index += 1;
            }
        }
        path_index += 1;
    }

    Prefix {
        matched: true,
        path_index,
        command_index,
    }
}

fn create_new_segment_group(
    group: &UrlSegmentGroup,
    start_index: usize,
    commands: &[Command],
) -> Result<Arc<UrlSegmentGroup>, RouterError> {
    let keep = start_index.min(group.segments.len());
    let mut paths: Vec<UrlSegment> = group.segments[..keep].to_vec();

    let mut i = 0;
    while i < commands.len() {
        match &commands[i] {
            Command::Outlets(outlets) => {
                let children = create_new_segment_children(outlets)?;
                return Ok(UrlSegmentGroup::new(paths, children));
            }
            Command::Params(params) if i == 0 => {
                // A leading params object re-applies to the segment at the
                // starting position.
                let segment =
                    group
                        .segments
                        .get(start_index)
                        .ok_or_else(|| RouterError::InvalidCommand {
                            message: "cannot apply matrix parameters: no segment at the starting position"
                                .to_string(),
                        })?;
                paths.push(UrlSegment::with_parameters(
                    segment.path.clone(),
                    params.clone(),
                ));
                i += 1;
            }
            Command::Params(_) => {
                return Err(RouterError::InvalidCommand {
                    message: "matrix parameters must follow a path segment".to_string(),
                });
            }
            Command::Path(path) => {
                if let Some(Command::Params(params)) = commands.get(i + 1) {
                    paths.push(UrlSegment::with_parameters(path.clone(), params.clone()));
                    i += 2;
                } else {
                    paths.push(UrlSegment::new(path.clone()));
                    i += 1;
                }
            }
        }
    }
    Ok(UrlSegmentGroup::new(paths, Vec::new()))
}

fn create_new_segment_children(
    outlets: &[(String, Option<Vec<Command>>)],
) -> Result<Vec<(String, Arc<UrlSegmentGroup>)>, RouterError> {
    let mut children = Vec::new();
    for (outlet, commands) in outlets {
        if let Some(commands) = commands {
            let child = create_new_segment_group(&UrlSegmentGroup::empty(), 0, commands)?;
            children.push((outlet.clone(), child));
        }
    }
    Ok(children)
}

fn children_vec(group: &UrlSegmentGroup) -> Vec<(String, Arc<UrlSegmentGroup>)> {
    group
        .children()
        .map(|(name, child)| (name.to_string(), Arc::clone(child)))
        .collect()
}

fn assemble(
    old_group: &Arc<UrlSegmentGroup>,
    new_group: Arc<UrlSegmentGroup>,
    current: &UrlTree,
    query_params: QueryParams,
    fragment: Option<String>,
) -> UrlTree {
    let root = if Arc::ptr_eq(old_group, &current.root) {
        new_group
    } else {
        replace_segment(&current.root, old_group, &new_group)
    };
    UrlTree::new(root, query_params, fragment)
}

fn replace_segment(
    current: &Arc<UrlSegmentGroup>,
    old_group: &Arc<UrlSegmentGroup>,
    new_group: &Arc<UrlSegmentGroup>,
) -> Arc<UrlSegmentGroup> {
    let children = current
        .children()
        .map(|(name, child)| {
            if Arc::ptr_eq(child, old_group) {
                (name.to_string(), Arc::clone(new_group))
            } else {
                (name.to_string(), replace_segment(child, old_group, new_group))
            }
        })
        .collect();
    UrlSegmentGroup::new(current.segments.clone(), children)
}
