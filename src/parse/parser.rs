use super::ast::*;
use super::error::{ParseError, ParseErrorKind};
use super::lexer::{Token, TokenKind};
use crate::common::*;
use crate::config::Config;

type PResult<T = Node> = Result<T, ParseError>;

pub struct Parser<'t, 'a> {
    tokens: &'t [Token<'a>],
    pos: usize,
    next_id: u32,
    /// Parens and calls currently open.
    nesting: usize,
    config: Config,
}

impl<'t, 'a> Parser<'t, 'a> {
    const ADDITION_OPS: &'static [TokenKind] = &[TokenKind::Plus, TokenKind::Minus];

    const MULTIPLICATION_OPS: &'static [TokenKind] = &[TokenKind::Star, TokenKind::Slash];

    const BINARY_OPS: &'static [TokenKind] = &[
        TokenKind::Plus,
        TokenKind::Minus,
        TokenKind::Star,
        TokenKind::Slash,
    ];

    const FACTOR_START: &'static [TokenKind] = &[
        TokenKind::Integer,
        TokenKind::Dice,
        TokenKind::LeftParen,
        TokenKind::Identifier,
    ];

    pub fn new(tokens: &'t [Token<'a>], config: Config) -> Self {
        Self {
            tokens,
            pos: 0,
            next_id: 0,
            nesting: 0,
            config,
        }
    }

    pub fn parse(mut self) -> PResult<Expression> {
        let root = self.parse_expression()?;
        if self.peek().is_some() {
            return self.unexpected_token(Self::BINARY_OPS.to_vec());
        }
        Ok(Expression::new(root, self.next_id as usize))
    }

    fn peek(&self) -> Option<TokenKind> {
        self.tokens.get(self.pos).map(|t| t.kind)
    }

    fn advance(&mut self) -> Option<&'t Token<'a>> {
        let tokens = self.tokens;
        let token = tokens.get(self.pos)?;
        self.pos += 1;
        Some(token)
    }

    fn matches(&self, kind: TokenKind) -> bool {
        self.peek() == Some(kind)
    }

    fn matches_any(&self, options: &[TokenKind]) -> bool {
        self.peek().map_or(false, |peeked| options.contains(&peeked))
    }

    fn consume(&mut self, expected: TokenKind) -> PResult<&'t Token<'a>> {
        let tokens = self.tokens;
        match tokens.get(self.pos) {
            Some(token) if token.kind == expected => {
                self.pos += 1;
                Ok(token)
            }
            _ => self.unexpected_token(vec![expected]),
        }
    }

    fn error_at<T>(&self, index: usize, kind: ParseErrorKind) -> PResult<T> {
        let (span, slice) = match self.tokens.get(index) {
            Some(token) => (token.span.clone(), token.slice.to_string()),
            None => {
                let end = self.tokens.last().map_or(0, |t| t.span.end);
                (end..end, String::new())
            }
        };
        Err(ParseError {
            kind,
            index,
            span,
            slice,
        })
    }

    fn unexpected_token<T>(&self, expected: Vec<TokenKind>) -> PResult<T> {
        match self.peek() {
            Some(found) => self.error_at(self.pos, ParseErrorKind::UnexpectedToken { found, expected }),
            None => self.error_at(self.pos, ParseErrorKind::UnexpectedEnd { expected }),
        }
    }

    fn binary_op(&mut self, options: &[TokenKind]) -> Option<BinaryOperator> {
        if self.matches_any(options) {
            self.advance().and_then(|t| t.kind.as_binary_op())
        } else {
            None
        }
    }

    fn too_deep<T>(&self, index: usize) -> PResult<T> {
        self.error_at(
            index,
            ParseErrorKind::TooDeep {
                limit: self.config.max_depth,
            },
        )
    }

    /// Rejects `node` if it makes the tree taller than the configured limit.
    fn bounded(&self, index: usize, node: Node) -> PResult {
        if node.height() > self.config.max_depth {
            self.too_deep(index)
        } else {
            Ok(node)
        }
    }

    fn enter(&mut self, index: usize) -> PResult<()> {
        self.nesting += 1;
        if self.nesting > self.config.max_depth {
            return self.too_deep(index);
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.nesting -= 1;
    }

    fn next_node_id(&mut self) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        id
    }

    fn parse_expression(&mut self) -> PResult {
        let mut lhs = self.parse_term()?;

        while let Some(op) = self.binary_op(Self::ADDITION_OPS) {
            let index = self.pos - 1;
            let rhs = self.parse_term()?;
            lhs = self.bounded(index, Node::binary(op, lhs, rhs))?;
        }

        Ok(lhs)
    }

    fn parse_term(&mut self) -> PResult {
        let mut lhs = self.parse_factor()?;

        while let Some(op) = self.binary_op(Self::MULTIPLICATION_OPS) {
            let index = self.pos - 1;
            let rhs = self.parse_factor()?;
            lhs = self.bounded(index, Node::binary(op, lhs, rhs))?;
        }

        Ok(lhs)
    }

    fn parse_factor(&mut self) -> PResult {
        match self.peek() {
            Some(TokenKind::Integer) => self.parse_number_or_dice(),
            Some(TokenKind::Dice) => self.parse_dice(NonZeroUInt::MIN),
            Some(TokenKind::LeftParen) => self.parse_parens(),
            Some(TokenKind::Identifier) => self.parse_call(),
            _ => self.unexpected_token(Self::FACTOR_START.to_vec()),
        }
    }

    fn parse_number_or_dice(&mut self) -> PResult {
        let index = self.pos;
        let token = self.consume(TokenKind::Integer)?;

        if self.matches(TokenKind::Dice) {
            let count = self.parse_count(index, token.slice)?;
            self.parse_dice(count)
        } else {
            match token.slice.parse::<Int>() {
                Ok(value) => Ok(Node::literal(value)),
                Err(_) => self.error_at(index, ParseErrorKind::NumberTooLarge),
            }
        }
    }

    fn parse_count(&self, index: usize, slice: &str) -> PResult<NonZeroUInt> {
        let count: UInt = match slice.parse() {
            Ok(count) => count,
            Err(_) => return self.error_at(index, ParseErrorKind::NumberTooLarge),
        };

        let limit = self.config.max_dice;
        match NonZeroUInt::new(count) {
            None => self.error_at(index, ParseErrorKind::ZeroCount),
            Some(_) if count > limit => self.error_at(index, ParseErrorKind::TooManyDice { count, limit }),
            Some(count) => Ok(count),
        }
    }

    fn parse_dice(&mut self, count: NonZeroUInt) -> PResult {
        let dice_index = self.pos;
        self.consume(TokenKind::Dice)?;

        if !self.matches(TokenKind::Integer) {
            return self.error_at(dice_index, ParseErrorKind::MissingSides);
        }

        let index = self.pos;
        let token = self.consume(TokenKind::Integer)?;
        let sides = match token.slice.parse::<UInt>() {
            Ok(sides) => NonZeroUInt::new(sides),
            Err(_) => return self.error_at(index, ParseErrorKind::NumberTooLarge),
        };

        match sides {
            Some(sides) => Ok(Node::Dice(DiceRoll::new(self.next_node_id(), count, sides))),
            None => self.error_at(index, ParseErrorKind::ZeroSides),
        }
    }

    fn parse_parens(&mut self) -> PResult {
        let index = self.pos;
        let open = self.consume(TokenKind::LeftParen)?.span.start;
        self.enter(index)?;
        let inner = self.parse_expression()?;

        match self.peek() {
            Some(TokenKind::RightParen) => {
                self.advance();
                self.leave();
                Ok(inner)
            }
            Some(_) => {
                let mut expected = vec![TokenKind::RightParen];
                expected.extend_from_slice(Self::BINARY_OPS);
                self.unexpected_token(expected)
            }
            None => self.error_at(self.pos, ParseErrorKind::UnclosedParen { open }),
        }
    }

    fn parse_call(&mut self) -> PResult {
        let index = self.pos;
        let name = self.consume(TokenKind::Identifier)?.slice;

        let function = match name {
            "max" => Function::Max,
            "min" => Function::Min,
            "sum" => Function::Sum,
            "top" => Function::Top(self.parse_keep_count(name)?),
            "bottom" => Function::Bottom(self.parse_keep_count(name)?),
            "count" => Function::Count(self.parse_count_target()?),
            _ => return self.error_at(index, ParseErrorKind::UnknownFunction(name.to_string())),
        };

        self.enter(index)?;
        let mut args = vec1![self.parse_expression()?];
        while self.matches(TokenKind::Comma) {
            self.advance();
            args.push(self.parse_expression()?);
        }
        self.leave();

        self.bounded(index, Node::call(function, args))
    }

    fn parse_keep_count(&mut self, function: &str) -> PResult<NonZeroUInt> {
        let index = self.pos;
        let token = self.consume(TokenKind::Integer)?;
        let value: UInt = match token.slice.parse() {
            Ok(value) => value,
            Err(_) => return self.error_at(index, ParseErrorKind::NumberTooLarge),
        };

        match NonZeroUInt::new(value) {
            Some(n) => Ok(n),
            None => self.error_at(
                index,
                ParseErrorKind::InvalidParameter {
                    function: function.to_string(),
                    value,
                },
            ),
        }
    }

    fn parse_count_target(&mut self) -> PResult<Int> {
        let index = self.pos;
        let token = self.consume(TokenKind::Integer)?;
        match token.slice.parse() {
            Ok(value) => Ok(value),
            Err(_) => self.error_at(index, ParseErrorKind::NumberTooLarge),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::tokenize;
    use pretty_assertions::assert_eq;

    fn nz(x: UInt) -> NonZeroUInt {
        NonZeroUInt::new(x).unwrap()
    }

    fn dice(id: u32, count: UInt, sides: UInt) -> Node {
        Node::Dice(DiceRoll::new(NodeId(id), nz(count), nz(sides)))
    }

    fn parse_with(s: &str, config: Config) -> PResult<Expression> {
        let tokens = tokenize(s).unwrap();
        Parser::new(&tokens, config).parse()
    }

    fn parse(s: &str) -> PResult<Expression> {
        parse_with(s, Config::default())
    }

    fn check(s: &str, expected: Node) {
        let parsed = parse(s).unwrap();
        assert_eq!(parsed.root, expected);
    }

    fn check_err(s: &str, index: usize, expected: ParseErrorKind) {
        let err = parse(s).unwrap_err();
        assert_eq!((err.index, err.kind), (index, expected));
    }

    #[test]
    fn test_parse_nums() {
        check("32", Node::literal(32));
        check("007", Node::literal(7));
    }

    #[test]
    fn test_parse_dice() {
        check("1d20", dice(0, 1, 20));
        check("d20", dice(0, 1, 20));
        check("4D6", dice(0, 4, 6));
        assert_eq!(parse("d6").unwrap(), parse("1d6").unwrap());
    }

    #[test]
    fn test_parse_binary() {
        check(
            "3d6 + 2",
            Node::binary(BinaryOperator::Add, dice(0, 3, 6), Node::literal(2)),
        );
        check(
            "1 + 2 * 3",
            Node::binary(
                BinaryOperator::Add,
                Node::literal(1),
                Node::binary(BinaryOperator::Mul, Node::literal(2), Node::literal(3)),
            ),
        );
        check(
            "8 - 2 - 1",
            Node::binary(
                BinaryOperator::Sub,
                Node::binary(BinaryOperator::Sub, Node::literal(8), Node::literal(2)),
                Node::literal(1),
            ),
        );
        check(
            "(1d4 + 1) / 2",
            Node::binary(
                BinaryOperator::Div,
                Node::binary(BinaryOperator::Add, dice(0, 1, 4), Node::literal(1)),
                Node::literal(2),
            ),
        );
    }

    #[test]
    fn test_node_ids_in_source_order() {
        check(
            "1d4 * (2d6 + d8)",
            Node::binary(
                BinaryOperator::Mul,
                dice(0, 1, 4),
                Node::binary(BinaryOperator::Add, dice(1, 2, 6), dice(2, 1, 8)),
            ),
        );
        assert_eq!(parse("1d4 * (2d6 + d8)").unwrap().dice_count(), 3);
    }

    #[test]
    fn test_parse_calls() {
        check("max 2d20", Node::call(Function::Max, vec1![dice(0, 2, 20)]));
        check(
            "min 1d20, 1d20",
            Node::call(Function::Min, vec1![dice(0, 1, 20), dice(1, 1, 20)]),
        );
        check(
            "top 3 4d6",
            Node::call(Function::Top(nz(3)), vec1![dice(0, 4, 6)]),
        );
        check(
            "count 6 10d6",
            Node::call(Function::Count(6), vec1![dice(0, 10, 6)]),
        );
        // the argument is a full expression
        check(
            "max 2d20 + 5",
            Node::call(
                Function::Max,
                vec1![Node::binary(BinaryOperator::Add, dice(0, 2, 20), Node::literal(5))],
            ),
        );
        check(
            "(max 2d20) + 5",
            Node::binary(
                BinaryOperator::Add,
                Node::call(Function::Max, vec1![dice(0, 2, 20)]),
                Node::literal(5),
            ),
        );
    }

    #[test]
    fn test_err_missing_sides() {
        check_err("3d", 1, ParseErrorKind::MissingSides);
        check_err("3d + 1", 1, ParseErrorKind::MissingSides);
        let err = parse("3d").unwrap_err();
        assert_eq!((err.span, err.slice.as_str()), (1..2, "d"));
    }

    #[test]
    fn test_err_bad_dice() {
        check_err("0d6", 0, ParseErrorKind::ZeroCount);
        check_err("2d0", 2, ParseErrorKind::ZeroSides);
        check_err("2d99999999999", 2, ParseErrorKind::NumberTooLarge);
        check_err(
            "20000d6",
            0,
            ParseErrorKind::TooManyDice {
                count: 20000,
                limit: crate::config::DEFAULT_MAX_DICE,
            },
        );
        let err = parse_with("11d6", Config::default().with_max_dice(10)).unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::TooManyDice { count: 11, limit: 10 });
    }

    #[test]
    fn test_err_grammar() {
        check_err(
            "",
            0,
            ParseErrorKind::UnexpectedEnd {
                expected: Parser::FACTOR_START.to_vec(),
            },
        );
        check_err(
            "1 +",
            2,
            ParseErrorKind::UnexpectedEnd {
                expected: Parser::FACTOR_START.to_vec(),
            },
        );
        check_err(
            "3 4",
            1,
            ParseErrorKind::UnexpectedToken {
                found: TokenKind::Integer,
                expected: Parser::BINARY_OPS.to_vec(),
            },
        );
        check_err(
            ")",
            0,
            ParseErrorKind::UnexpectedToken {
                found: TokenKind::RightParen,
                expected: Parser::FACTOR_START.to_vec(),
            },
        );
        check_err("(1 + 2", 4, ParseErrorKind::UnclosedParen { open: 0 });
        // commas only separate call arguments; `sum 1d6, 1d8` pools them
        assert!(parse("sum 1d6, 1d8").is_ok());
        check_err(
            "1d6, 1d8",
            3,
            ParseErrorKind::UnexpectedToken {
                found: TokenKind::Comma,
                expected: Parser::BINARY_OPS.to_vec(),
            },
        );
    }

    #[test]
    fn test_err_functions() {
        check_err("avg 3d6", 0, ParseErrorKind::UnknownFunction("avg".into()));
        check_err("2 * MAX 1d6", 2, ParseErrorKind::UnknownFunction("MAX".into()));
        check_err(
            "top 0 4d6",
            1,
            ParseErrorKind::InvalidParameter {
                function: "top".into(),
                value: 0,
            },
        );
        check_err(
            "bottom d6",
            1,
            ParseErrorKind::UnexpectedToken {
                found: TokenKind::Dice,
                expected: vec![TokenKind::Integer],
            },
        );
        check_err(
            "max",
            1,
            ParseErrorKind::UnexpectedEnd {
                expected: Parser::FACTOR_START.to_vec(),
            },
        );
    }

    fn check_depth_err(s: &str, max_depth: usize, index: usize) {
        let err = parse_with(s, Config::default().with_max_depth(max_depth)).unwrap_err();
        assert_eq!((err.index, err.kind), (index, ParseErrorKind::TooDeep { limit: max_depth }));
    }

    #[test]
    fn test_depth_limit_chains() {
        let config = Config::default().with_max_depth(4);
        assert!(parse_with("1 + 1 + 1 + 1", config).is_ok());
        assert!(parse_with("2 * 2 * 2 * 2", config).is_ok());
        check_depth_err("1 + 1 + 1 + 1 + 1", 4, 7);
        check_depth_err("2 * 2 * 2 * 2 * 2", 4, 7);
        check_depth_err("1 + 2 * 2 * 2 * 2", 4, 1);
    }

    #[test]
    fn test_depth_limit_nesting() {
        let config = Config::default().with_max_depth(4);
        assert!(parse_with("((((1d6))))", config).is_ok());
        check_depth_err("(((((1d6)))))", 4, 4);
        check_depth_err("max max max max max 1d6", 4, 4);
        // the call itself is one level above its arguments
        assert!(parse_with("max 1 + 1 + 1", config).is_ok());
        check_depth_err("max 1 + 1 + 1 + 1", 4, 0);
    }

    #[test]
    fn test_default_depth_limit() {
        let long_sum = vec!["1"; 5000].join("+");
        check_err(&long_sum, 511, ParseErrorKind::TooDeep { limit: 256 });

        let nested = format!("{}1d6{}", "(".repeat(100_000), ")".repeat(100_000));
        check_err(&nested, 256, ParseErrorKind::TooDeep { limit: 256 });

        let within = vec!["1"; 256].join("+");
        assert_eq!(parse(&within).unwrap().root().height(), 256);
    }
}
