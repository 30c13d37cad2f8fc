//! Executor chain: policy decorators around the argument-binding terminal link.
//!
//! Every link implements [`CommandExecutor`]. Decorators own exactly one inner
//! link and either deny with an [`Outcome`] or forward the untouched token
//! stream. Policy links must sit outside [`BindingExecutor`] so they run before
//! any token is consumed or any handler side effect happens.

use tracing::{debug, debug_span, error};

use super::caller::Caller;
use super::descriptor::{CallerRestriction, CommandExecutable};
use super::outcome::Outcome;
use super::parser::{ArgumentParser, ParserRegistry};
use super::tokenizer::TokenStream;
use super::value::ArgumentValue;
use crate::error::{DispatchError, Result};

/// One link of the executor chain.
pub trait CommandExecutor: Send + Sync {
    fn execute(
        &self,
        executable: &CommandExecutable,
        arguments: &mut TokenStream,
        caller: &Caller,
    ) -> Outcome;
}

/// Parameter values in binding order, addressable by name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoundArguments {
    values: Vec<(String, ArgumentValue)>,
}

impl BoundArguments {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            values: Vec::with_capacity(capacity),
        }
    }

    fn push(&mut self, name: &str, value: ArgumentValue) {
        self.values.push((name.to_string(), value));
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Looks up a value by parameter name.
    pub fn get(&self, name: &str) -> Option<&ArgumentValue> {
        self.values
            .iter()
            .find(|(param, _)| param == name)
            .map(|(_, value)| value)
    }

    /// Looks up a value by binding position.
    pub fn get_index(&self, index: usize) -> Option<&ArgumentValue> {
        self.values.get(index).map(|(_, value)| value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ArgumentValue)> {
        self.values.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn get_i32(&self, name: &str) -> Option<i32> {
        match self.get(name)? {
            ArgumentValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Any fixed-width integer, widened to `i64`.
    pub fn get_i64(&self, name: &str) -> Option<i64> {
        match self.get(name)? {
            ArgumentValue::Byte(v) => Some(i64::from(*v)),
            ArgumentValue::Short(v) => Some(i64::from(*v)),
            ArgumentValue::Int(v) => Some(i64::from(*v)),
            ArgumentValue::Long(v) => Some(*v),
            _ => None,
        }
    }

    /// Any float, widened to `f64`.
    pub fn get_f64(&self, name: &str) -> Option<f64> {
        match self.get(name)? {
            ArgumentValue::Float(v) => Some(f64::from(*v)),
            ArgumentValue::Double(v) => Some(*v),
            _ => None,
        }
    }

    pub fn get_bool(&self, name: &str) -> Option<bool> {
        match self.get(name)? {
            ArgumentValue::Boolean(v) => Some(*v),
            _ => None,
        }
    }

    pub fn get_char(&self, name: &str) -> Option<char> {
        match self.get(name)? {
            ArgumentValue::Char(v) => Some(*v),
            _ => None,
        }
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        match self.get(name)? {
            ArgumentValue::String(v) => Some(v),
            _ => None,
        }
    }

    /// JSON object of parameter name to value.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.values
                .iter()
                .map(|(name, value)| (name.clone(), value.to_json()))
                .collect(),
        )
    }
}

/// Terminal link: binds every parameter, then invokes the handler.
///
/// Binding is fail-fast. The first parameter that fails stops binding and the
/// handler is never called. Tokens left over after the last parameter are
/// also a usage error.
pub struct BindingExecutor {
    parser: Box<dyn ArgumentParser>,
}

impl BindingExecutor {
    pub fn new<P>(parser: P) -> Self
    where
        P: ArgumentParser + 'static,
    {
        Self {
            parser: Box::new(parser),
        }
    }

    /// A binding link backed by the process-wide parser registry.
    pub fn with_global_parsers() -> Self {
        Self::new(ParserRegistry::global())
    }

    /// Binds the executable's parameters from the stream in declaration order.
    pub fn bind(
        &self,
        executable: &CommandExecutable,
        arguments: &mut TokenStream,
    ) -> Result<BoundArguments> {
        let mut bound = BoundArguments::with_capacity(executable.parameters().len());
        for parameter in executable.parameters() {
            let value = self.parser.parse(arguments, parameter)?;
            bound.push(parameter.name(), value);
        }

        if !arguments.is_empty() {
            return Err(DispatchError::unexpected(format!(
                "'{}' takes {} argument(s), got extra: {}",
                executable.name(),
                executable.parameters().len(),
                arguments.remaining_tokens().join(" ")
            )));
        }

        Ok(bound)
    }
}

impl CommandExecutor for BindingExecutor {
    fn execute(
        &self,
        executable: &CommandExecutable,
        arguments: &mut TokenStream,
        caller: &Caller,
    ) -> Outcome {
        match self.bind(executable, arguments) {
            Ok(bound) => executable.handler().handle(caller, &bound),
            Err(e) if e.is_configuration_defect() => {
                error!(command = executable.name(), "{}: {}", e.category(), e);
                Outcome::from(&e)
            }
            Err(e) => {
                debug!(command = executable.name(), error = %e, "argument binding failed");
                Outcome::from(&e)
            }
        }
    }
}

/// Enforces interactive-only and non-interactive-only restrictions.
pub struct CallerTypeCheckingExecutor {
    inner: Box<dyn CommandExecutor>,
}

impl CallerTypeCheckingExecutor {
    pub fn new(inner: Box<dyn CommandExecutor>) -> Self {
        Self { inner }
    }

    /// Returns true if the caller's kind satisfies the restriction.
    pub fn permits(restriction: CallerRestriction, caller: &Caller) -> bool {
        match restriction {
            CallerRestriction::None => true,
            CallerRestriction::InteractiveOnly => caller.is_interactive(),
            CallerRestriction::NonInteractiveOnly => !caller.is_interactive(),
        }
    }
}

impl CommandExecutor for CallerTypeCheckingExecutor {
    fn execute(
        &self,
        executable: &CommandExecutable,
        arguments: &mut TokenStream,
        caller: &Caller,
    ) -> Outcome {
        if !Self::permits(executable.caller_restriction(), caller) {
            debug!(
                command = executable.name(),
                caller = caller.kind(),
                restriction = ?executable.caller_restriction(),
                "caller type not permitted"
            );
            return Outcome::NoPermission;
        }
        self.inner.execute(executable, arguments, caller)
    }
}

/// Records each invocation and its outcome in a tracing span.
pub struct TracingExecutor {
    inner: Box<dyn CommandExecutor>,
}

impl TracingExecutor {
    pub fn new(inner: Box<dyn CommandExecutor>) -> Self {
        Self { inner }
    }
}

impl CommandExecutor for TracingExecutor {
    fn execute(
        &self,
        executable: &CommandExecutable,
        arguments: &mut TokenStream,
        caller: &Caller,
    ) -> Outcome {
        let span = debug_span!(
            "command",
            name = executable.name(),
            caller = %caller,
            kind = caller.kind()
        );
        let _guard = span.enter();

        let outcome = self.inner.execute(executable, arguments, caller);
        debug!(?outcome, "command finished");
        outcome
    }
}

/// A linear chain of executors, built innermost first.
pub struct ExecutorChain {
    head: Box<dyn CommandExecutor>,
}

impl ExecutorChain {
    /// Starts a chain from its terminal link.
    pub fn new<E>(terminal: E) -> Self
    where
        E: CommandExecutor + 'static,
    {
        Self {
            head: Box::new(terminal),
        }
    }

    /// Wraps the current chain in another decorator, which becomes the new head.
    pub fn wrap<F, E>(self, decorate: F) -> Self
    where
        F: FnOnce(Box<dyn CommandExecutor>) -> E,
        E: CommandExecutor + 'static,
    {
        Self {
            head: Box::new(decorate(self.head)),
        }
    }

    /// Binding link, caller-type check, then tracing on the outside.
    pub fn standard<P>(parser: P) -> Self
    where
        P: ArgumentParser + 'static,
    {
        Self::new(BindingExecutor::new(parser))
            .wrap(CallerTypeCheckingExecutor::new)
            .wrap(TracingExecutor::new)
    }
}

impl Default for ExecutorChain {
    fn default() -> Self {
        Self::standard(ParserRegistry::global())
    }
}

impl CommandExecutor for ExecutorChain {
    fn execute(
        &self,
        executable: &CommandExecutable,
        arguments: &mut TokenStream,
        caller: &Caller,
    ) -> Outcome {
        self.head.execute(executable, arguments, caller)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::descriptor::{ParameterDescriptor, RangeConstraint};
    use crate::dispatch::value::ParamType;
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    /// Handler that counts calls and remembers the last bound arguments.
    #[derive(Default)]
    struct Recorder {
        calls: AtomicUsize,
        last: Mutex<Option<BoundArguments>>,
    }

    impl Recorder {
        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn last(&self) -> Option<BoundArguments> {
            self.last.lock().unwrap().clone()
        }
    }

    fn command(
        recorder: &Arc<Recorder>,
        configure: impl FnOnce(crate::dispatch::CommandBuilder) -> crate::dispatch::CommandBuilder,
    ) -> CommandExecutable {
        let recorder = Arc::clone(recorder);
        configure(CommandExecutable::builder("test"))
            .handler(move |_: &Caller, args: &BoundArguments| {
                recorder.calls.fetch_add(1, Ordering::SeqCst);
                *recorder.last.lock().unwrap() = Some(args.clone());
                Outcome::Success
            })
            .build()
            .unwrap()
    }

    fn clamped_int(method: RangeConstraint) -> ParameterDescriptor {
        ParameterDescriptor::new("int1", ParamType::Int).with_range(method)
    }

    fn run(executable: &CommandExecutable, line: &str, caller: &Caller) -> Outcome {
        let mut stream = TokenStream::from_line(line);
        ExecutorChain::default().execute(executable, &mut stream, caller)
    }

    #[test]
    fn test_validate_out_of_bounds_skips_handler() {
        let recorder = Arc::new(Recorder::default());
        let cmd = command(&recorder, |b| {
            b.param(clamped_int(RangeConstraint::validate(0, 10)))
        });

        let outcome = run(&cmd, "15", &Caller::interactive("Steve"));
        assert_eq!(outcome, Outcome::OutOfBounds);
        assert_eq!(recorder.calls(), 0);
    }

    #[test]
    fn test_limit_binds_clamped_value() {
        let recorder = Arc::new(Recorder::default());
        let cmd = command(&recorder, |b| b.param(clamped_int(RangeConstraint::limit(0, 10))));

        let outcome = run(&cmd, "15", &Caller::interactive("Steve"));
        assert_eq!(outcome, Outcome::Success);
        assert_eq!(recorder.calls(), 1);
        assert_eq!(recorder.last().unwrap().get_i32("int1"), Some(10));
    }

    #[test]
    fn test_malformed_regardless_of_method() {
        for range in [RangeConstraint::validate(0, 10), RangeConstraint::limit(0, 10)] {
            let recorder = Arc::new(Recorder::default());
            let cmd = command(&recorder, |b| b.param(clamped_int(range)));

            let outcome = run(&cmd, "abc", &Caller::interactive("Steve"));
            assert_eq!(outcome, Outcome::MalformedArgument);
            assert_eq!(recorder.calls(), 0);
        }
    }

    /// Parser that counts how often each parameter name is attempted.
    struct CountingParser {
        attempts: Arc<Mutex<Vec<String>>>,
    }

    impl ArgumentParser for CountingParser {
        fn can_parse_parameter(&self, parameter: &ParameterDescriptor) -> bool {
            ParserRegistry::global().can_parse_parameter(parameter)
        }

        fn parse(
            &self,
            arguments: &mut TokenStream,
            parameter: &ParameterDescriptor,
        ) -> Result<ArgumentValue> {
            self.attempts.lock().unwrap().push(parameter.name().to_string());
            ParserRegistry::global().parse(arguments, parameter)
        }
    }

    #[test]
    fn test_binding_is_fail_fast() {
        let recorder = Arc::new(Recorder::default());
        let cmd = command(&recorder, |b| {
            b.param(ParameterDescriptor::new("a", ParamType::Int))
                .param(ParameterDescriptor::new("b", ParamType::Boolean))
                .param(ParameterDescriptor::new("c", ParamType::Char))
        });

        let attempts = Arc::new(Mutex::new(Vec::new()));
        let chain = ExecutorChain::standard(CountingParser {
            attempts: Arc::clone(&attempts),
        });
        let mut stream = TokenStream::from_line("1 maybe x");
        let outcome = chain.execute(&cmd, &mut stream, &Caller::NonInteractive);

        assert_eq!(outcome, Outcome::MalformedArgument);
        assert_eq!(*attempts.lock().unwrap(), vec!["a", "b"]);
        assert_eq!(recorder.calls(), 0);
    }

    #[test]
    fn test_binds_in_declaration_order() {
        let recorder = Arc::new(Recorder::default());
        let cmd = command(&recorder, |b| {
            b.param(clamped_int(RangeConstraint::validate(0, 10)))
                .param(ParameterDescriptor::new("bool", ParamType::Boolean))
                .param(ParameterDescriptor::new("c", ParamType::Char))
        });

        assert_eq!(run(&cmd, "7 true z", &Caller::NonInteractive), Outcome::Success);
        let bound = recorder.last().unwrap();
        assert_eq!(bound.len(), 3);
        assert_eq!(bound.get_index(0), Some(&ArgumentValue::Int(7)));
        assert_eq!(bound.get_bool("bool"), Some(true));
        assert_eq!(bound.get_char("c"), Some('z'));
        let names: Vec<_> = bound.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["int1", "bool", "c"]);
    }

    #[test]
    fn test_missing_and_extra_tokens_are_invalid_usage() {
        let recorder = Arc::new(Recorder::default());
        let cmd = command(&recorder, |b| {
            b.param(ParameterDescriptor::new("name", ParamType::String))
        });

        assert_eq!(run(&cmd, "", &Caller::NonInteractive), Outcome::InvalidUsage);
        assert_eq!(run(&cmd, "a b", &Caller::NonInteractive), Outcome::InvalidUsage);
        assert_eq!(recorder.calls(), 0);
    }

    #[test]
    fn test_handler_outcome_is_returned() {
        let cmd = CommandExecutable::builder("fail")
            .handler(|_: &Caller, _: &BoundArguments| Outcome::Failure)
            .build()
            .unwrap();
        assert_eq!(run(&cmd, "", &Caller::NonInteractive), Outcome::Failure);
    }

    #[test]
    fn test_interactive_only_polarity() {
        let recorder = Arc::new(Recorder::default());
        let cmd = command(&recorder, |b| b.interactive_only());

        assert_eq!(run(&cmd, "", &Caller::NonInteractive), Outcome::NoPermission);
        assert_eq!(recorder.calls(), 0);

        assert_eq!(run(&cmd, "", &Caller::interactive("Alex")), Outcome::Success);
        assert_eq!(recorder.calls(), 1);
    }

    #[test]
    fn test_non_interactive_only_polarity() {
        let recorder = Arc::new(Recorder::default());
        let cmd = command(&recorder, |b| b.non_interactive_only());

        assert_eq!(run(&cmd, "", &Caller::interactive("Alex")), Outcome::NoPermission);
        assert_eq!(recorder.calls(), 0);

        assert_eq!(run(&cmd, "", &Caller::NonInteractive), Outcome::Success);
        assert_eq!(recorder.calls(), 1);
    }

    #[test]
    fn test_unrestricted_forwards_everyone() {
        let recorder = Arc::new(Recorder::default());
        let cmd = command(&recorder, |b| b);

        assert_eq!(run(&cmd, "", &Caller::NonInteractive), Outcome::Success);
        assert_eq!(run(&cmd, "", &Caller::interactive("Alex")), Outcome::Success);
        assert_eq!(recorder.calls(), 2);
    }

    #[test]
    fn test_denial_consumes_no_tokens() {
        let recorder = Arc::new(Recorder::default());
        let cmd = command(&recorder, |b| {
            b.interactive_only()
                .param(ParameterDescriptor::new("x", ParamType::Int))
        });

        let mut stream = TokenStream::from_line("5");
        let outcome = ExecutorChain::default().execute(&cmd, &mut stream, &Caller::NonInteractive);
        assert_eq!(outcome, Outcome::NoPermission);
        assert_eq!(stream.position(), 0);
    }

    #[test]
    fn test_policy_denies_before_parsing() {
        let recorder = Arc::new(Recorder::default());
        let cmd = command(&recorder, |b| {
            b.non_interactive_only()
                .param(ParameterDescriptor::new("x", ParamType::Int))
        });

        // A malformed argument would be reported if parsing ran first.
        assert_eq!(
            run(&cmd, "abc", &Caller::interactive("Alex")),
            Outcome::NoPermission
        );
    }

    #[test]
    fn test_console_scenario_with_sentinel_name() {
        let recorder = Arc::new(Recorder::default());
        let cmd = command(&recorder, |b| {
            b.non_interactive_only()
                .param(clamped_int(RangeConstraint::validate(0, 10)))
        });

        let console = Caller::from_display_name("CONSOLE", "CONSOLE");
        assert_eq!(run(&cmd, "3", &console), Outcome::Success);

        let player = Caller::from_display_name("Steve", "CONSOLE");
        assert_eq!(run(&cmd, "3", &player), Outcome::NoPermission);
        assert_eq!(recorder.calls(), 1);
    }

    #[test]
    fn test_custom_decorator_can_be_added() {
        struct DenyAll;
        impl CommandExecutor for DenyAll {
            fn execute(&self, _: &CommandExecutable, _: &mut TokenStream, _: &Caller) -> Outcome {
                Outcome::NoPermission
            }
        }

        struct Maintenance {
            inner: Box<dyn CommandExecutor>,
        }
        impl CommandExecutor for Maintenance {
            fn execute(
                &self,
                executable: &CommandExecutable,
                arguments: &mut TokenStream,
                caller: &Caller,
            ) -> Outcome {
                if caller.is_interactive() {
                    return Outcome::Failure;
                }
                self.inner.execute(executable, arguments, caller)
            }
        }

        let recorder = Arc::new(Recorder::default());
        let cmd = command(&recorder, |b| b);
        let chain = ExecutorChain::new(BindingExecutor::with_global_parsers())
            .wrap(CallerTypeCheckingExecutor::new)
            .wrap(|inner| Maintenance { inner });

        let mut stream = TokenStream::default();
        assert_eq!(
            chain.execute(&cmd, &mut stream, &Caller::interactive("Alex")),
            Outcome::Failure
        );
        assert_eq!(
            chain.execute(&cmd, &mut stream, &Caller::NonInteractive),
            Outcome::Success
        );

        let denied = ExecutorChain::new(DenyAll);
        assert_eq!(
            denied.execute(&cmd, &mut stream, &Caller::NonInteractive),
            Outcome::NoPermission
        );
        assert_eq!(recorder.calls(), 1);
    }

    #[test]
    fn test_bound_arguments_to_json() {
        let recorder = Arc::new(Recorder::default());
        let cmd = command(&recorder, |b| {
            b.param(ParameterDescriptor::new("n", ParamType::Long))
                .param(ParameterDescriptor::new("who", ParamType::String))
        });
        run(&cmd, "5 alex", &Caller::NonInteractive);
        assert_eq!(
            recorder.last().unwrap().to_json(),
            serde_json::json!({"n": 5, "who": "alex"})
        );
    }

    #[derive(Clone, Default)]
    struct CapturedWriter(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for CapturedWriter {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_tracing_passes_outcome_through() {
        let recorder = Arc::new(Recorder::default());
        let cmd = command(&recorder, |b| {
            b.param(clamped_int(RangeConstraint::validate(0, 10)))
        });
        let chain = ExecutorChain::new(BindingExecutor::with_global_parsers())
            .wrap(TracingExecutor::new);

        let writer = CapturedWriter::default();
        let sink = writer.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer(move || sink.clone())
            .finish();

        let alex = Caller::interactive("Alex");
        let (rejected, accepted) = tracing::subscriber::with_default(subscriber, || {
            let rejected = chain.execute(&cmd, &mut TokenStream::from_line("15"), &alex);
            let accepted =
                chain.execute(&cmd, &mut TokenStream::from_line("4"), &Caller::NonInteractive);
            (rejected, accepted)
        });

        assert_eq!(rejected, Outcome::OutOfBounds);
        assert_eq!(accepted, Outcome::Success);
        assert_eq!(recorder.calls(), 1);

        let output = String::from_utf8(writer.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("command finished"));
        assert!(output.contains("outcome=OutOfBounds"));
        assert!(output.contains("outcome=Success"));
        assert!(output.contains("caller=Alex"));
        assert!(output.contains("kind=\"non-interactive\""));
    }

    #[test]
    fn test_executors_are_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ExecutorChain>();
        assert_send_sync::<CommandExecutable>();
    }
}
