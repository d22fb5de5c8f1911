//! Turning a validated configuration into live formatters, handlers and
//! logger nodes.

use super::validation::{HandlerKind, HandlerPlan, LoggerPlan, ValidatedConfig};
use crate::core::error::{LoggerError, Result};
use crate::core::formatter::Formatter;
use crate::core::handler::Handler;
use crate::core::hierarchy::Hierarchy;
use crate::core::sink::{ErrorCallback, Sink};
use crate::core::timestamp::Clock;
use crate::sinks::{ConsoleSink, RotatingFileSink};
use std::collections::BTreeMap;
use std::sync::Arc;

pub type FormatterMap = BTreeMap<String, Arc<Formatter>>;
pub type HandlerMap = BTreeMap<String, Arc<Handler>>;

pub fn build_formatters(validated: &ValidatedConfig) -> FormatterMap {
    validated
        .formatters
        .iter()
        .map(|(name, formatter)| (name.clone(), Arc::new(formatter.clone())))
        .collect()
}

/// Open one handler's sink.
///
/// # Errors
///
/// A sink that cannot be opened is a [`LoggerError::SinkInit`] naming the
/// handler.
pub fn build_handler(
    name: &str,
    plan: &HandlerPlan,
    formatter: Arc<Formatter>,
    clock: &Arc<dyn Clock>,
    on_error: &ErrorCallback,
) -> Result<Handler> {
    let (sink, colors): (Box<dyn Sink>, bool) = match &plan.kind {
        HandlerKind::Console { stream, colors } => (Box::new(ConsoleSink::new(*stream)), *colors),
        HandlerKind::RotatingFile { path, policy } => {
            let sink = RotatingFileSink::with_clock(path, policy.clone(), Arc::clone(clock))
                .map_err(|e| LoggerError::sink_init(name, e.to_string()))?
                .with_error_callback(Arc::clone(on_error));
            (Box::new(sink), false)
        }
    };

    Ok(Handler::new(name, plan.level, formatter, sink)
        .with_colors(colors)
        .with_error_callback(Arc::clone(on_error)))
}

/// Build every handler in `validated`, resolving formatter names against
/// `formatters`
pub fn build_handlers(
    validated: &ValidatedConfig,
    formatters: &FormatterMap,
    clock: &Arc<dyn Clock>,
    on_error: &ErrorCallback,
) -> Result<HandlerMap> {
    let mut handlers = HandlerMap::new();
    for (name, plan) in &validated.handlers {
        let formatter = formatters.get(&plan.formatter).cloned().ok_or_else(|| {
            LoggerError::config(
                format!("handlers.{}.formatter", name),
                format!("unknown formatter '{}'", plan.formatter),
            )
        })?;
        let handler = build_handler(name, plan, formatter, clock, on_error)?;
        handlers.insert(name.clone(), Arc::new(handler));
    }
    Ok(handlers)
}

fn resolve_handlers(path: &str, names: &[String], handlers: &HandlerMap) -> Result<Vec<Arc<Handler>>> {
    names
        .iter()
        .map(|name| {
            handlers.get(name).cloned().ok_or_else(|| {
                LoggerError::config(
                    format!("{}.handlers", path),
                    format!("unknown handler '{}'", name),
                )
            })
        })
        .collect()
}

fn apply_node(
    hierarchy: &mut Hierarchy,
    name: &str,
    plan: &LoggerPlan,
    handlers: &HandlerMap,
) -> Result<()> {
    let path = if name.is_empty() {
        "root".to_string()
    } else {
        format!("loggers.{}", name)
    };
    let bound = resolve_handlers(&path, &plan.handlers, handlers)?;
    hierarchy.set_level(name, plan.level)?;
    let node = hierarchy.ensure(name)?;
    node.handlers = bound;
    node.propagate = plan.propagate;
    Ok(())
}

/// Register configured loggers (and the root, when present) in `hierarchy`
pub fn apply_loggers(
    hierarchy: &mut Hierarchy,
    validated: &ValidatedConfig,
    handlers: &HandlerMap,
) -> Result<()> {
    for (name, plan) in &validated.loggers {
        apply_node(hierarchy, name, plan, handlers)?;
    }
    if let Some(root) = &validated.root {
        apply_node(hierarchy, "", root, handlers)?;
    }
    Ok(())
}

/// Point nodes bound to a handler that was just redefined at the new one
pub fn rebind_handlers(hierarchy: &mut Hierarchy, replaced: &HandlerMap) {
    for node in hierarchy.nodes_mut() {
        for handler in node.handlers.iter_mut() {
            if let Some(fresh) = replaced.get(handler.name()) {
                *handler = Arc::clone(fresh);
            }
        }
    }
}
