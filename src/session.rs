use crate::common::Int;
use crate::config::Config;
use crate::parse::{self, Expression};
use crate::roll::{self, AnsiStringifier, Evaluation, PlainStringifier, RollError, RollRecords, Roller, Stringify};
use crate::Error;

/// Reply to the detail command before anything has been rolled.
pub const NO_ROLL_YET: &str = "no roll yet";

/// The most recent successful roll.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct LastRoll {
    pub input: String,
    pub expression: Expression,
    pub records: RollRecords,
    pub value: Int,
}

/// State carried between commands: nothing, or the last successful roll.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub enum RollSession {
    #[default]
    Empty,
    Rolled(LastRoll),
}

impl RollSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    pub fn last(&self) -> Option<&LastRoll> {
        match self {
            Self::Empty => None,
            Self::Rolled(roll) => Some(roll),
        }
    }

    /// Replaces whatever was stored before.
    pub fn store(&mut self, roll: LastRoll) {
        *self = Self::Rolled(roll);
    }

    /// The trace of the last roll, or [`NO_ROLL_YET`].
    ///
    /// # Errors
    /// Returns [`RollError::Internal`] if the stored records do not match the stored tree.
    pub fn detail(&self) -> Result<String, RollError> {
        self.detail_with(&PlainStringifier)
    }

    pub fn detail_with<S: Stringify + ?Sized>(&self, style: &S) -> Result<String, RollError> {
        match self {
            Self::Empty => Ok(NO_ROLL_YET.to_string()),
            Self::Rolled(roll) => style.str_expression(&roll.expression, &roll.records),
        }
    }
}

/// One line of user input.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Command<'a> {
    /// Show the trace of the last roll (`?`).
    Detail,
    /// Roll the last rolled line again (an empty line).
    Repeat,
    Roll(&'a str),
}

impl<'a> Command<'a> {
    pub fn parse(line: &'a str) -> Self {
        match line.trim() {
            "?" => Self::Detail,
            "" => Self::Repeat,
            input => Self::Roll(input),
        }
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Reply {
    Total(Int),
    Trace(String),
    /// Nothing to do, e.g. repeating before anything was rolled.
    Nothing,
}

/// Runs commands against a [`RollSession`].
pub struct Interpreter<R> {
    roller: R,
    config: Config,
    session: RollSession,
    last_line: Option<String>,
    color: bool,
}

impl<R: Roller> Interpreter<R> {
    pub fn new(roller: R) -> Self {
        Self {
            roller,
            config: Config::default(),
            session: RollSession::Empty,
            last_line: None,
            color: false,
        }
    }

    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Colour traces with ANSI escapes.
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    pub fn session(&self) -> &RollSession {
        &self.session
    }

    /// The line an empty input repeats, as it was rolled.
    pub fn last_line(&self) -> Option<&str> {
        self.last_line.as_deref()
    }

    /// Executes one line of input.
    ///
    /// The session is only updated when a roll fully succeeds.
    ///
    /// # Errors
    /// Returns the lex, parse or evaluation error of a failed roll.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn execute(&mut self, line: &str) -> Result<Reply, Error> {
        match Command::parse(line) {
            Command::Detail => Ok(Reply::Trace(self.detail()?)),
            Command::Repeat => match self.last_line.clone() {
                Some(input) => self.roll(&input).map(Reply::Total),
                None => Ok(Reply::Nothing),
            },
            Command::Roll(input) => {
                self.last_line = Some(input.to_string());
                self.roll(input).map(Reply::Total)
            }
        }
    }

    /// Tokenizes, parses and evaluates `input`, storing it as the last roll.
    ///
    /// # Errors
    /// Returns the first error hit; the session is left untouched.
    pub fn roll(&mut self, input: &str) -> Result<Int, Error> {
        let tokens = parse::tokenize(input)?;
        let expression = parse::parse_with(&tokens, &self.config)?;
        let Evaluation { value, records } = roll::evaluate(&expression, &mut self.roller)?;

        tracing::debug!(input, value, "storing roll");
        self.session.store(LastRoll {
            input: input.to_string(),
            expression,
            records,
            value,
        });
        Ok(value)
    }

    /// The trace of the last roll.
    ///
    /// # Errors
    /// Returns [`RollError::Internal`] if the session is inconsistent.
    pub fn detail(&self) -> Result<String, RollError> {
        if self.color {
            self.session.detail_with(&AnsiStringifier)
        } else {
            self.session.detail()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::ParseErrorKind;
    use crate::roll::{FixedRoller, ScriptedRoller};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_command_parse() {
        assert_eq!(Command::parse(" ? "), Command::Detail);
        assert_eq!(Command::parse(""), Command::Repeat);
        assert_eq!(Command::parse("  \t"), Command::Repeat);
        assert_eq!(Command::parse(" 3d6 + 2\n"), Command::Roll("3d6 + 2"));
        assert_eq!(Command::parse("??"), Command::Roll("??"));
    }

    #[test]
    fn test_detail_before_roll() {
        let mut interp = Interpreter::new(FixedRoller(1));
        assert_eq!(interp.execute("?").unwrap(), Reply::Trace(NO_ROLL_YET.to_string()));
        assert_eq!(interp.session(), &RollSession::new());
        assert!(interp.session().is_empty());
    }

    #[test]
    fn test_detail_after_roll() {
        let mut interp = Interpreter::new(ScriptedRoller::new([1, 4]));
        assert_eq!(interp.execute("2d4").unwrap(), Reply::Total(5));
        assert_eq!(
            interp.execute("?").unwrap(),
            Reply::Trace("2d4 = 5\n    2d4 : 1, 4 = 5".to_string())
        );
    }

    #[test]
    fn test_failed_roll_keeps_session() {
        let mut interp = Interpreter::new(FixedRoller(4));
        assert_eq!(interp.execute("10 / 0").unwrap_err(), Error::Roll(RollError::DivideByZero { divisor: "0".into() }));
        assert_eq!(interp.session(), &RollSession::Empty);

        interp.execute("3d6 + 2").unwrap();
        let before = interp.session().clone();

        assert!(matches!(interp.execute("10 / (1d4 - 4)"), Err(Error::Roll(RollError::DivideByZero { .. }))));
        assert!(matches!(interp.execute("3d6 $ 2"), Err(Error::Lex(_))));
        assert!(matches!(interp.execute("3d"), Err(Error::Parse(_))));
        assert_eq!(interp.session(), &before);
        assert_eq!(interp.session().last().map(|r| r.value), Some(14));
    }

    #[test]
    fn test_missing_sides_points_at_dice() {
        let mut interp = Interpreter::new(FixedRoller(1));
        match interp.execute("3d").unwrap_err() {
            Error::Parse(err) => {
                assert_eq!(err.kind, ParseErrorKind::MissingSides);
                assert_eq!(err.slice, "d");
                assert_eq!(err.index, 1);
            }
            other => panic!("expected a parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_repeat_last_line() {
        let mut interp = Interpreter::new(ScriptedRoller::new([2, 5]));
        assert_eq!(interp.execute("").unwrap(), Reply::Nothing);
        assert_eq!(interp.execute("1d6").unwrap(), Reply::Total(2));
        assert_eq!(interp.execute("").unwrap(), Reply::Total(5));
        assert_eq!(interp.session().last().map(|r| r.input.as_str()), Some("1d6"));
    }

    #[test]
    fn test_repeat_after_failure_repeats_failure() {
        let mut interp = Interpreter::new(FixedRoller(1));
        interp.execute("1d6").unwrap();
        assert!(interp.execute("1d6 +").is_err());
        assert!(matches!(
            interp.execute(""),
            Err(Error::Parse(crate::ParseError {
                kind: ParseErrorKind::UnexpectedEnd { .. },
                ..
            }))
        ));
    }

    #[test]
    fn test_config_limits_dice() {
        let mut interp = Interpreter::new(FixedRoller(1)).with_config(Config::default().with_max_dice(5));
        assert!(interp.execute("5d6").is_ok());
        assert!(matches!(
            interp.execute("6d6"),
            Err(Error::Parse(crate::ParseError {
                kind: ParseErrorKind::TooManyDice { count: 6, limit: 5 },
                ..
            }))
        ));
    }

    #[test]
    fn test_error_positions() {
        let mut interp = Interpreter::new(FixedRoller(1));
        assert_eq!(interp.execute("1d6 # 2").unwrap_err().position(), Some(4));
        assert_eq!(interp.execute("1d6 + foo").unwrap_err().position(), Some(6));
        assert_eq!(interp.execute("1 / 0").unwrap_err().position(), None);
    }

    #[test]
    fn test_deep_input_is_rejected() {
        let mut interp = Interpreter::new(FixedRoller(3));
        interp.execute("1d6 + 1").unwrap();
        let before = interp.session().clone();

        let long_sum = vec!["1"; 5000].join("+");
        assert!(matches!(
            interp.execute(&long_sum),
            Err(Error::Parse(crate::ParseError {
                kind: ParseErrorKind::TooDeep { limit: 256 },
                ..
            }))
        ));
        let nested = format!("{}1d6{}", "(".repeat(100_000), ")".repeat(100_000));
        assert!(matches!(interp.execute(&nested), Err(Error::Parse(_))));
        assert_eq!(interp.session(), &before);

        let mut shallow = Interpreter::new(FixedRoller(3)).with_config(Config::default().with_max_depth(2));
        assert_eq!(shallow.execute("1d6 + 1").unwrap(), Reply::Total(4));
        assert!(shallow.execute("1d6 + 1 + 1").is_err());
    }

    #[test]
    fn test_last_line_is_trimmed_and_kept_on_failure() {
        let mut interp = Interpreter::new(FixedRoller(2));
        assert_eq!(interp.last_line(), None);
        interp.execute("  2d6 ").unwrap();
        assert_eq!(interp.last_line(), Some("2d6"));
        assert!(interp.execute("2d6 +").is_err());
        assert_eq!(interp.last_line(), Some("2d6 +"));
        assert!(interp.execute("").is_err());
        assert_eq!(interp.last_line(), Some("2d6 +"));
    }
}
