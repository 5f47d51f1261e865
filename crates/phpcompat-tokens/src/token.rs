//! Token kinds and the annotated token record
//!
//! Kind names follow the classic tokenizer constants (`T_COALESCE`,
//! `T_OPEN_SHORT_ARRAY`, ...) so feature tables can key on them.

macro_rules! token_kinds {
    ($(
        $(#[$doc:meta])*
        $variant:ident => $name:literal
    ),* $(,)?) => {
        /// Closed set of token kinds produced by the tokenizer
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum TokenKind {$(
            $(#[$doc])*
            $variant,
        )*}

        impl TokenKind {
            /// Every kind, in declaration order
            pub const ALL: &'static [TokenKind] = &[$(TokenKind::$variant,)*];

            /// The tokenizer constant name, e.g. `T_COALESCE`
            pub fn name(self) -> &'static str {
                match self {
                    $(TokenKind::$variant => $name,)*
                }
            }

            /// Look a kind up by its tokenizer constant name
            pub fn from_name(name: &str) -> Option<Self> {
                match name {
                    $($name => Some(TokenKind::$variant),)*
                    _ => None,
                }
            }
        }
    };
}

token_kinds! {
    // Markup and trivia
    InlineHtml => "T_INLINE_HTML",
    OpenTag => "T_OPEN_TAG",
    OpenTagWithEcho => "T_OPEN_TAG_WITH_ECHO",
    CloseTag => "T_CLOSE_TAG",
    Whitespace => "T_WHITESPACE",
    Comment => "T_COMMENT",
    DocComment => "T_DOC_COMMENT",
    /// `#[` attribute opener
    Attribute => "T_ATTRIBUTE",

    // Names and literals
    /// Bare identifier (function, class, constant names and unrecognised keywords)
    Identifier => "T_STRING",
    Variable => "T_VARIABLE",
    LNumber => "T_LNUMBER",
    DNumber => "T_DNUMBER",
    /// String literal without interpolation, quotes included
    ConstantString => "T_CONSTANT_ENCAPSED_STRING",
    /// Double quoted string containing interpolation
    DoubleQuotedString => "T_DOUBLE_QUOTED_STRING",
    StartHeredoc => "T_START_HEREDOC",
    Heredoc => "T_HEREDOC",
    EndHeredoc => "T_END_HEREDOC",
    StartNowdoc => "T_START_NOWDOC",
    Nowdoc => "T_NOWDOC",
    EndNowdoc => "T_END_NOWDOC",
    True => "T_TRUE",
    False => "T_FALSE",
    Null => "T_NULL",
    NsSeparator => "T_NS_SEPARATOR",

    // Keywords
    Abstract => "T_ABSTRACT",
    Array => "T_ARRAY",
    As => "T_AS",
    Break => "T_BREAK",
    Callable => "T_CALLABLE",
    Case => "T_CASE",
    Catch => "T_CATCH",
    Class => "T_CLASS",
    /// `class` following `new`
    AnonClass => "T_ANON_CLASS",
    Clone => "T_CLONE",
    Const => "T_CONST",
    Continue => "T_CONTINUE",
    Declare => "T_DECLARE",
    Default => "T_DEFAULT",
    Do => "T_DO",
    Echo => "T_ECHO",
    Else => "T_ELSE",
    ElseIf => "T_ELSEIF",
    Empty => "T_EMPTY",
    EndDeclare => "T_ENDDECLARE",
    EndFor => "T_ENDFOR",
    EndForeach => "T_ENDFOREACH",
    EndIf => "T_ENDIF",
    EndSwitch => "T_ENDSWITCH",
    EndWhile => "T_ENDWHILE",
    Enum => "T_ENUM",
    Eval => "T_EVAL",
    Exit => "T_EXIT",
    Extends => "T_EXTENDS",
    Final => "T_FINAL",
    Finally => "T_FINALLY",
    /// Arrow function `fn`
    Fn => "T_FN",
    For => "T_FOR",
    Foreach => "T_FOREACH",
    Function => "T_FUNCTION",
    /// `function` without a name
    Closure => "T_CLOSURE",
    Global => "T_GLOBAL",
    Goto => "T_GOTO",
    HaltCompiler => "T_HALT_COMPILER",
    If => "T_IF",
    Implements => "T_IMPLEMENTS",
    Include => "T_INCLUDE",
    IncludeOnce => "T_INCLUDE_ONCE",
    Instanceof => "T_INSTANCEOF",
    Insteadof => "T_INSTEADOF",
    Interface => "T_INTERFACE",
    Isset => "T_ISSET",
    List => "T_LIST",
    LogicalAnd => "T_LOGICAL_AND",
    LogicalOr => "T_LOGICAL_OR",
    LogicalXor => "T_LOGICAL_XOR",
    Match => "T_MATCH",
    Namespace => "T_NAMESPACE",
    New => "T_NEW",
    Print => "T_PRINT",
    Private => "T_PRIVATE",
    Protected => "T_PROTECTED",
    Public => "T_PUBLIC",
    Readonly => "T_READONLY",
    Require => "T_REQUIRE",
    RequireOnce => "T_REQUIRE_ONCE",
    Return => "T_RETURN",
    Static => "T_STATIC",
    Switch => "T_SWITCH",
    Throw => "T_THROW",
    Trait => "T_TRAIT",
    Try => "T_TRY",
    Unset => "T_UNSET",
    Use => "T_USE",
    Var => "T_VAR",
    While => "T_WHILE",
    Yield => "T_YIELD",
    YieldFrom => "T_YIELD_FROM",

    // Magic constants
    Line => "T_LINE",
    File => "T_FILE",
    Dir => "T_DIR",
    ClassC => "T_CLASS_C",
    FuncC => "T_FUNC_C",
    MethodC => "T_METHOD_C",
    NsC => "T_NS_C",
    TraitC => "T_TRAIT_C",

    // Casts
    IntCast => "T_INT_CAST",
    DoubleCast => "T_DOUBLE_CAST",
    StringCast => "T_STRING_CAST",
    ArrayCast => "T_ARRAY_CAST",
    ObjectCast => "T_OBJECT_CAST",
    BoolCast => "T_BOOL_CAST",
    UnsetCast => "T_UNSET_CAST",
    BinaryCast => "T_BINARY_CAST",

    // Brackets
    OpenParen => "T_OPEN_PARENTHESIS",
    CloseParen => "T_CLOSE_PARENTHESIS",
    OpenSquareBracket => "T_OPEN_SQUARE_BRACKET",
    CloseSquareBracket => "T_CLOSE_SQUARE_BRACKET",
    OpenShortArray => "T_OPEN_SHORT_ARRAY",
    CloseShortArray => "T_CLOSE_SHORT_ARRAY",
    OpenCurly => "T_OPEN_CURLY_BRACKET",
    CloseCurly => "T_CLOSE_CURLY_BRACKET",

    // Punctuation and operators
    Semicolon => "T_SEMICOLON",
    Comma => "T_COMMA",
    Colon => "T_COLON",
    DoubleColon => "T_DOUBLE_COLON",
    ObjectOperator => "T_OBJECT_OPERATOR",
    NullsafeObjectOperator => "T_NULLSAFE_OBJECT_OPERATOR",
    DoubleArrow => "T_DOUBLE_ARROW",
    Ellipsis => "T_ELLIPSIS",
    InlineThen => "T_INLINE_THEN",
    Coalesce => "T_COALESCE",
    CoalesceEqual => "T_COALESCE_EQUAL",
    Equal => "T_EQUAL",
    PlusEqual => "T_PLUS_EQUAL",
    MinusEqual => "T_MINUS_EQUAL",
    MulEqual => "T_MUL_EQUAL",
    DivEqual => "T_DIV_EQUAL",
    ConcatEqual => "T_CONCAT_EQUAL",
    ModEqual => "T_MOD_EQUAL",
    AndEqual => "T_AND_EQUAL",
    OrEqual => "T_OR_EQUAL",
    XorEqual => "T_XOR_EQUAL",
    SlEqual => "T_SL_EQUAL",
    SrEqual => "T_SR_EQUAL",
    PowEqual => "T_POW_EQUAL",
    IsEqual => "T_IS_EQUAL",
    IsNotEqual => "T_IS_NOT_EQUAL",
    IsIdentical => "T_IS_IDENTICAL",
    IsNotIdentical => "T_IS_NOT_IDENTICAL",
    LessThan => "T_LESS_THAN",
    GreaterThan => "T_GREATER_THAN",
    IsSmallerOrEqual => "T_IS_SMALLER_OR_EQUAL",
    IsGreaterOrEqual => "T_IS_GREATER_OR_EQUAL",
    Spaceship => "T_SPACESHIP",
    BooleanAnd => "T_BOOLEAN_AND",
    BooleanOr => "T_BOOLEAN_OR",
    BooleanNot => "T_BOOLEAN_NOT",
    BitwiseAnd => "T_BITWISE_AND",
    BitwiseOr => "T_BITWISE_OR",
    BitwiseXor => "T_BITWISE_XOR",
    BitwiseNot => "T_BITWISE_NOT",
    Sl => "T_SL",
    Sr => "T_SR",
    Plus => "T_PLUS",
    Minus => "T_MINUS",
    Multiply => "T_MULTIPLY",
    Divide => "T_DIVIDE",
    Modulus => "T_MODULUS",
    Pow => "T_POW",
    StringConcat => "T_STRING_CONCAT",
    Inc => "T_INC",
    Dec => "T_DEC",
    Asperand => "T_ASPERAND",
    Dollar => "T_DOLLAR",
    Backtick => "T_BACKTICK",
    BadCharacter => "T_BAD_CHARACTER",
}

impl TokenKind {
    /// Whitespace and comments
    pub const EMPTY: &'static [TokenKind] = &[
        TokenKind::Whitespace,
        TokenKind::Comment,
        TokenKind::DocComment,
    ];

    /// Operators the loose numeric evaluator treats as arithmetic
    pub const ARITHMETIC: &'static [TokenKind] = &[
        TokenKind::Plus,
        TokenKind::Minus,
        TokenKind::Multiply,
        TokenKind::Divide,
        TokenKind::Modulus,
        TokenKind::Pow,
    ];

    /// Keywords that own a `{ }` scope
    pub const SCOPE_OWNERS: &'static [TokenKind] = &[
        TokenKind::Class,
        TokenKind::AnonClass,
        TokenKind::Interface,
        TokenKind::Trait,
        TokenKind::Enum,
        TokenKind::Function,
        TokenKind::Closure,
        TokenKind::Namespace,
        TokenKind::If,
        TokenKind::ElseIf,
        TokenKind::Else,
        TokenKind::For,
        TokenKind::Foreach,
        TokenKind::While,
        TokenKind::Do,
        TokenKind::Switch,
        TokenKind::Try,
        TokenKind::Catch,
        TokenKind::Finally,
        TokenKind::Declare,
        TokenKind::Match,
    ];

    /// Class-like declarations
    pub const OO_SCOPES: &'static [TokenKind] = &[
        TokenKind::Class,
        TokenKind::AnonClass,
        TokenKind::Interface,
        TokenKind::Trait,
        TokenKind::Enum,
    ];

    pub fn is_empty(self) -> bool {
        Self::EMPTY.contains(&self)
    }

    pub fn is_scope_owner(self) -> bool {
        Self::SCOPE_OWNERS.contains(&self)
    }

    pub fn is_oo_scope(self) -> bool {
        Self::OO_SCOPES.contains(&self)
    }

    /// Tokens that carry literal string content
    pub fn is_string(self) -> bool {
        matches!(
            self,
            TokenKind::ConstantString
                | TokenKind::DoubleQuotedString
                | TokenKind::StartHeredoc
                | TokenKind::Heredoc
                | TokenKind::EndHeredoc
                | TokenKind::StartNowdoc
                | TokenKind::Nowdoc
                | TokenKind::EndNowdoc
        )
    }

    /// Openers whose closer is recorded in the side tables
    pub fn is_opener(self) -> bool {
        matches!(
            self,
            TokenKind::OpenParen
                | TokenKind::OpenSquareBracket
                | TokenKind::OpenShortArray
                | TokenKind::OpenCurly
                | TokenKind::Attribute
        )
    }

    pub fn is_closer(self) -> bool {
        matches!(
            self,
            TokenKind::CloseParen
                | TokenKind::CloseSquareBracket
                | TokenKind::CloseShortArray
                | TokenKind::CloseCurly
        )
    }

    /// Operators that access a member of the preceding expression
    pub fn is_member_access(self) -> bool {
        matches!(
            self,
            TokenKind::ObjectOperator | TokenKind::NullsafeObjectOperator | TokenKind::DoubleColon
        )
    }
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// One token plus the navigation side tables computed for it.
///
/// Side-table indexes point into the owning [`crate::TokenStream`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,

    /// Raw source text
    pub text: String,

    /// Line number (1-indexed)
    pub line: usize,

    /// Column number (1-indexed, counted in bytes)
    pub column: usize,

    /// For `(` and `)`: the matching parenthesis
    pub matching_paren: Option<usize>,

    /// For `(` and `)`: the token that owns the parenthesis pair, if any
    pub paren_owner: Option<usize>,

    /// For square brackets, short arrays, attributes and braces: the matching token
    pub matching_bracket: Option<usize>,

    /// For scope owners and their braces: the `{` of the scope
    pub scope_opener: Option<usize>,

    /// For scope owners and their braces: the `}` of the scope
    pub scope_closer: Option<usize>,

    /// For scope braces: the owning keyword
    pub scope_owner: Option<usize>,

    /// Scope owners enclosing this token, outermost first
    pub enclosing_scopes: Vec<usize>,

    /// Open parentheses enclosing this token, outermost first
    pub enclosing_parens: Vec<usize>,
}

impl Token {
    /// A bare token; side tables are filled in by [`crate::TokenStream::new`]
    pub fn new(kind: TokenKind, text: impl Into<String>, line: usize, column: usize) -> Self {
        Self {
            kind,
            text: text.into(),
            line,
            column,
            matching_paren: None,
            paren_owner: None,
            matching_bracket: None,
            scope_opener: None,
            scope_closer: None,
            scope_owner: None,
            enclosing_scopes: Vec::new(),
            enclosing_parens: Vec::new(),
        }
    }

    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }

    pub fn is_empty(&self) -> bool {
        self.kind.is_empty()
    }

    /// Lowercased text, for case-insensitive symbol lookups
    pub fn text_lowercase(&self) -> String {
        self.text.to_ascii_lowercase()
    }

    /// Parenthesis nesting depth
    pub fn paren_depth(&self) -> usize {
        self.enclosing_parens.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for kind in TokenKind::ALL {
            assert_eq!(TokenKind::from_name(kind.name()), Some(*kind));
        }
        assert_eq!(TokenKind::from_name("T_NOT_A_TOKEN"), None);
    }

    #[test]
    fn classification() {
        assert!(TokenKind::Whitespace.is_empty());
        assert!(!TokenKind::Identifier.is_empty());
        assert!(TokenKind::Closure.is_scope_owner());
        assert!(TokenKind::Trait.is_oo_scope());
        assert!(TokenKind::Nowdoc.is_string());
        assert!(TokenKind::OpenShortArray.is_opener());
        assert!(TokenKind::DoubleColon.is_member_access());
    }

    #[test]
    fn token_helpers() {
        let token = Token::new(TokenKind::Identifier, "Array_Fill_Keys", 3, 1);
        assert_eq!(token.text_lowercase(), "array_fill_keys");
        assert_eq!(token.paren_depth(), 0);
        assert!(token.is(TokenKind::Identifier));
    }
}
