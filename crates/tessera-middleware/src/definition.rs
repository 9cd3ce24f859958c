//! Pipeline definitions.
//!
//! A [`Definition`] is an immutable record of what a procedure is made of:
//! the ordered steps, the declared input and output parsers, and the
//! terminal resolver. Composition never mutates a definition; [`Definition::merge`]
//! returns a new one and the prior value stays valid and reusable.

use crate::stages::resolve::Resolver;
use crate::step::{Step, StepKind};
use std::fmt;
use std::sync::Arc;
use tessera_core::{ConfigurationError, Parser};

/// Name used in logs and metrics for procedures that were never named.
pub const ANONYMOUS: &str = "anonymous";

/// The accumulated configuration of a procedure.
///
/// # Invariants
///
/// - Steps run in insertion order; composition only appends
/// - At most one resolver exists, and it is the last step
/// - Once a resolver is attached the step list never changes
#[derive(Clone, Default)]
pub struct Definition {
    name: Option<String>,
    steps: Vec<Step>,
    input: Option<Arc<dyn Parser>>,
    output: Option<Arc<dyn Parser>>,
    resolver: Option<Arc<dyn Resolver>>,
}

impl Definition {
    /// Creates an empty definition.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A patch that appends an input step and declares its parser.
    #[must_use]
    pub fn with_input(parser: Arc<dyn Parser>) -> Self {
        Self {
            steps: vec![Step::Input(crate::stages::InputParser::new(Arc::clone(&parser)))],
            input: Some(parser),
            ..Self::default()
        }
    }

    /// A patch that appends an output step and declares its parser.
    #[must_use]
    pub fn with_output(parser: Arc<dyn Parser>) -> Self {
        Self {
            steps: vec![Step::Output(crate::stages::OutputParser::new(Arc::clone(&parser)))],
            output: Some(parser),
            ..Self::default()
        }
    }

    /// A patch that appends a single step.
    ///
    /// A resolver step attaches its resolver, so the patch finalizes
    /// whatever it is merged onto.
    #[must_use]
    pub fn with_step(step: Step) -> Self {
        let resolver = match &step {
            Step::Resolver(resolver) => Some(Arc::clone(resolver)),
            _ => None,
        };
        Self {
            steps: vec![step],
            resolver,
            ..Self::default()
        }
    }

    /// A patch that attaches a resolver.
    #[must_use]
    pub fn with_resolver(resolver: Arc<dyn Resolver>) -> Self {
        Self {
            steps: vec![Step::Resolver(Arc::clone(&resolver))],
            resolver: Some(resolver),
            ..Self::default()
        }
    }

    /// A patch that only sets the name.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Structurally merges `patch` onto this definition.
    ///
    /// Steps are concatenated, prior first. Declared parsers, the resolver
    /// and the name take the patch's value if present, else keep this one's.
    ///
    /// Fails with [`ConfigurationError::AlreadyFinalized`] if this
    /// definition already has a resolver and the patch adds steps.
    pub fn merge(&self, patch: Self) -> Result<Self, ConfigurationError> {
        if self.is_finalized() && !patch.steps.is_empty() {
            return Err(ConfigurationError::AlreadyFinalized);
        }
        Ok(self.merge_unchecked(patch))
    }

    pub(crate) fn merge_unchecked(&self, patch: Self) -> Self {
        let mut steps = Vec::with_capacity(self.steps.len() + patch.steps.len());
        steps.extend(self.steps.iter().cloned());
        steps.extend(patch.steps);

        Self {
            name: patch.name.or_else(|| self.name.clone()),
            steps,
            input: patch.input.or_else(|| self.input.clone()),
            output: patch.output.or_else(|| self.output.clone()),
            resolver: patch.resolver.or_else(|| self.resolver.clone()),
        }
    }

    /// Returns the procedure name, if one was set.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Returns the steps in execution order.
    #[must_use]
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Returns the kinds of all steps in execution order.
    #[must_use]
    pub fn step_kinds(&self) -> Vec<StepKind> {
        self.steps.iter().map(Step::kind).collect()
    }

    /// Returns the most recently declared input parser.
    #[must_use]
    pub fn input_parser(&self) -> Option<&Arc<dyn Parser>> {
        self.input.as_ref()
    }

    /// Returns the most recently declared output parser.
    #[must_use]
    pub fn output_parser(&self) -> Option<&Arc<dyn Parser>> {
        self.output.as_ref()
    }

    /// Returns the resolver, if attached.
    #[must_use]
    pub fn resolver(&self) -> Option<&Arc<dyn Resolver>> {
        self.resolver.as_ref()
    }

    /// Returns `true` once a resolver is attached.
    #[must_use]
    pub fn is_finalized(&self) -> bool {
        self.resolver.is_some()
    }
}

impl fmt::Debug for Definition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Definition")
            .field("name", &self.name)
            .field("steps", &self.steps)
            .field("input", &self.input.as_ref().map(|p| p.name()))
            .field("output", &self.output.as_ref().map(|p| p.name()))
            .field("finalized", &self.is_finalized())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::{FnMiddleware, MiddlewareOptions, StepResult};
    use crate::stages::resolve::{FnResolver, ResolveOptions};
    use serde_json::Value;
    use tessera_core::{schema, Thrown};

    fn noop() -> Step {
        Step::user(FnMiddleware::new("noop", |opts: MiddlewareOptions| async move {
            StepResult::Ok(opts.next.run().await?)
        }))
    }

    fn null_resolver() -> Arc<dyn Resolver> {
        Arc::new(FnResolver::new(|_opts: ResolveOptions| async move {
            Ok::<_, Thrown>(Value::Null)
        }))
    }

    #[test]
    fn test_merge_appends_steps_and_keeps_prior() {
        let base = Definition::new().merge_unchecked(Definition::with_step(noop()));
        let extended = base.merge_unchecked(Definition::with_input(Arc::new(schema::<i64>())));

        assert_eq!(base.steps().len(), 1);
        assert_eq!(extended.step_kinds(), vec![StepKind::User, StepKind::Input]);
        assert!(base.input_parser().is_none());
        assert!(extended.input_parser().is_some());
    }

    #[test]
    fn test_declared_parser_is_replaced_but_steps_remain() {
        let def = Definition::new()
            .merge_unchecked(Definition::with_input(Arc::new(schema::<i64>())))
            .merge_unchecked(Definition::with_input(Arc::new(schema::<u8>())));

        assert_eq!(def.step_kinds(), vec![StepKind::Input, StepKind::Input]);
        assert_eq!(def.input_parser().map(|p| p.name()), Some("u8"));
    }

    #[test]
    fn test_patch_without_parser_keeps_declared_one() {
        let def = Definition::new()
            .merge_unchecked(Definition::with_output(Arc::new(schema::<String>())))
            .merge_unchecked(Definition::with_step(noop()));

        assert_eq!(def.output_parser().map(|p| p.name()), Some("alloc::string::String"));
    }

    #[test]
    fn test_finalized_definition_rejects_more_steps() {
        let def = Definition::new().merge_unchecked(Definition::with_resolver(null_resolver()));
        assert!(def.is_finalized());
        assert_eq!(def.step_kinds(), vec![StepKind::Resolver]);

        let result = def.merge(Definition::with_step(noop()));
        assert!(matches!(result, Err(ConfigurationError::AlreadyFinalized)));

        let renamed = def.merge(Definition::named("widget.get")).unwrap();
        assert_eq!(renamed.name(), Some("widget.get"));
    }

    #[test]
    fn test_resolver_step_patch_finalizes() {
        let def = Definition::new()
            .merge(Definition::with_step(Step::Resolver(null_resolver())))
            .unwrap();
        assert!(def.is_finalized());
        assert_eq!(def.step_kinds(), vec![StepKind::Resolver]);

        let result = def.merge(Definition::with_step(noop()));
        assert!(matches!(result, Err(ConfigurationError::AlreadyFinalized)));

        let result = crate::builder::ProcedureBuilder::from_definition(def);
        assert!(matches!(result, Err(ConfigurationError::AlreadyFinalized)));
    }

    #[test]
    fn test_name_falls_back_to_prior() {
        let def = Definition::named("a").merge_unchecked(Definition::with_step(noop()));
        assert_eq!(def.name(), Some("a"));

        let def = def.merge_unchecked(Definition::named("b"));
        assert_eq!(def.name(), Some("b"));
    }
}
