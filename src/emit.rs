//! The grammar emitter: samples TOML surface syntax while recording the
//! abstract value of everything it emits into a [`Context`].
//!
//! Every function that produces a value returns both the surface text and
//! the model value; the two are kept in lock-step so a conformant parser
//! applied to the document recovers exactly the model.

#[cfg(test)]
#[path = "./emit_tests.rs"]
mod tests;

use crate::rng::Rng;
use crate::time::{self, Date, Datetime, Time, TimeOffset};
use crate::tree::{Context, KeyPath};
use crate::value::{Table, Value};
use foldhash::HashSet;

/// Tunables controlling the shape of generated documents.
///
/// The defaults produce documents of up to 200 expressions exercising every
/// TOML construct. Tests pin individual fields to force scenarios.
#[derive(Clone, Debug)]
pub struct Config {
    /// Maximum number of expressions per document (at least one is emitted).
    pub max_expressions: u32,
    /// Mean length of a whitespace run.
    pub mean_ws_len: f64,
    /// Maximum length of a whitespace run.
    pub max_ws_len: u32,
    /// Mean number of characters in a comment.
    pub mean_comment_len: f64,
    /// Maximum number of characters in a comment.
    pub max_comment_len: u32,
    /// Mean length of an unquoted key segment.
    pub mean_key_len: f64,
    /// Maximum length of an unquoted key segment.
    pub max_key_len: u32,
    /// Mean length of a single-line string.
    pub mean_string_len: f64,
    /// Maximum length of a single-line string.
    pub max_string_len: u32,
    /// Mean number of units in a multiline string body.
    pub mean_ml_string_len: f64,
    /// Maximum number of units in a multiline string body.
    pub max_ml_string_len: u32,
    /// Mean number of array elements or inline-table entries.
    pub mean_array_elems: f64,
    /// Maximum number of array elements or inline-table entries.
    pub max_array_elems: u32,
    /// Maximum number of freshly drawn segments in a dotted key.
    pub max_dotted_len: u32,
    /// Upper bound on integer magnitude.
    pub max_int_value: u128,
    /// Probability of a trailing comment on an expression.
    pub prob_comment: f64,
    /// Probability that an expression is a key-value assignment.
    pub prob_expr_keyval: f64,
    /// Probability that an expression is a table or table-array header.
    pub prob_expr_table: f64,
    /// Probability of a tab-or-space character inside a comment.
    pub prob_comment_ws: f64,
    /// Probability of a delimiter-like character inside a comment.
    pub prob_comment_nasty: f64,
    /// Probability of a non-ASCII character inside a comment.
    pub prob_comment_nonascii: f64,
    /// Probability that a key segment is quoted.
    pub prob_quoted_key: f64,
    /// Probability of reusing an existing key or prefix when one exists.
    pub prob_existing_key: f64,
    /// Probability of escaping an escapable character in a basic string.
    pub prob_escape_char: f64,
    /// Probability of an embedded newline in a multiline string body.
    pub prob_ml_newline: f64,
    /// Probability of a line-continuation in a multiline basic string.
    pub prob_ml_escaped_newline: f64,
    /// Probability of a quote run in a multiline string body.
    pub prob_ml_quote: f64,
    /// Probability of emitting `inf`/`nan` instead of a numeric float.
    pub prob_special_float: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_expressions: 200,
            mean_ws_len: 2.0,
            max_ws_len: 100,
            mean_comment_len: 8.0,
            max_comment_len: 100,
            mean_key_len: 5.0,
            max_key_len: 100,
            mean_string_len: 10.0,
            max_string_len: 100,
            mean_ml_string_len: 25.0,
            max_ml_string_len: 200,
            mean_array_elems: 2.0,
            max_array_elems: 10,
            max_dotted_len: 3,
            max_int_value: 1 << 80,
            prob_comment: 0.5,
            prob_expr_keyval: 0.7,
            prob_expr_table: 0.1,
            prob_comment_ws: 0.1,
            prob_comment_nasty: 0.1,
            prob_comment_nonascii: 0.1,
            prob_quoted_key: 0.4,
            prob_existing_key: 0.5,
            prob_escape_char: 0.1,
            prob_ml_newline: 0.1,
            prob_ml_escaped_newline: 0.05,
            prob_ml_quote: 0.1,
            prob_special_float: 0.1,
        }
    }
}

/// A generated document together with the value it must parse to.
pub struct Generated {
    /// The TOML document. Always valid UTF-8; feed `document.as_bytes()` to
    /// a parser under test.
    pub document: String,
    /// The value a conformant parser must recover from `document`.
    pub model: Value,
}

/// The seven escapable characters of basic strings, ordered by codepoint.
const ESCAPES: [(char, char); 7] = [
    ('\u{8}', 'b'),
    ('\t', 't'),
    ('\n', 'n'),
    ('\u{c}', 'f'),
    ('\r', 'r'),
    ('"', '"'),
    ('\\', '\\'),
];

/// Integer surface forms: prefix, base, zero-paddable, sign multiplier.
const INT_FORMS: [(&str, IntBase, bool, i128); 6] = [
    ("", IntBase::Dec, false, 1),
    ("+", IntBase::Dec, false, 1),
    ("-", IntBase::Dec, false, -1),
    ("0x", IntBase::Hex, true, 1),
    ("0o", IntBase::Oct, true, 1),
    ("0b", IntBase::Bin, true, 1),
];

#[derive(Clone, Copy)]
enum IntBase {
    Dec,
    Hex,
    Oct,
    Bin,
}

/// Rejection-sampling bound for the key sampler; once a multiple of this
/// many candidates have clashed, the key is widened with an extra fresh
/// segment, which eventually dodges any finite exclude set.
const KEY_RETRY_LIMIT: u32 = 256;

fn is_unquoted_key_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

fn is_literal_char(c: char) -> bool {
    let u = c as u32;
    u == 0x09 || ((0x20..=0x7e).contains(&u) && c != '\'') || (0x80..=0xd7ff).contains(&u) || u >= 0xe000
}

fn is_basic_unescaped(c: char) -> bool {
    let u = c as u32;
    u == 0x09
        || ((0x20..=0x7e).contains(&u) && c != '"' && c != '\\')
        || (0x80..=0xd7ff).contains(&u)
        || u >= 0xe000
}

fn escape_symbol(c: char) -> Option<char> {
    ESCAPES.iter().find(|(ch, _)| *ch == c).map(|(_, sym)| *sym)
}

/// Stateful generator of random valid TOML documents.
///
/// Holds the PRNG and the configuration; each [`generate`](Self::generate)
/// call builds a fresh tree. Output is fully determined by the seed and the
/// configuration.
pub struct Generator {
    rng: Rng,
    config: Config,
}

impl Generator {
    /// Creates a generator with the default [`Config`].
    pub fn new(seed: u64) -> Self {
        Self::with_config(seed, Config::default())
    }

    /// Creates a generator with a custom [`Config`].
    pub fn with_config(seed: u64, config: Config) -> Self {
        Self {
            rng: Rng::new(seed),
            config,
        }
    }

    /// Generates one document/model pair.
    ///
    /// ```text
    /// toml = expression *( newline expression )
    /// ```
    pub fn generate(&mut self) -> Generated {
        let mut ctx = Context::new();
        let mut document = String::new();
        let n = self.rng.range(1, self.config.max_expressions as i64);
        for i in 0..n {
            if i > 0 {
                let nl = self.newline();
                document.push_str(nl);
            }
            let expr = self.expression(&mut ctx);
            document.push_str(&expr);
        }
        Generated {
            document,
            model: ctx.finalize(),
        }
    }

    // -- trivia -------------------------------------------------------------

    /// `newline = %x0A / %x0D %x0A`
    fn newline(&mut self) -> &'static str {
        self.rng.choice(&["\n", "\r\n"])
    }

    /// `ws = *wschar` with spaces four times as likely as tabs.
    fn ws(&mut self) -> String {
        let n = self
            .rng
            .rand_exp(self.config.mean_ws_len, 0, self.config.max_ws_len as i64);
        if n == 0 {
            return String::new();
        }
        self.rng
            .choices(&['\t', ' '], &[1.0, 4.0], n as usize)
            .into_iter()
            .collect()
    }

    /// Uniform codepoint in `[lo, hi]`; the caller keeps the range clear of
    /// the surrogate block.
    fn codepoint(&mut self, lo: u32, hi: u32) -> char {
        let c = self.rng.range(lo as i64, hi as i64) as u32;
        char::from_u32(c).expect("range avoids surrogates")
    }

    /// `comment = "#" *non-eol`
    ///
    /// Characters are drawn from five classes: whitespace, delimiter-like
    /// "nasty" characters, the two non-ASCII planes, and printable ASCII.
    fn comment(&mut self) -> String {
        let n = self.rng.rand_exp(
            self.config.mean_comment_len,
            0,
            self.config.max_comment_len as i64,
        );
        let w_nonascii = 0.5 * self.config.prob_comment_nonascii;
        let mut weights = [
            self.config.prob_comment_ws,
            self.config.prob_comment_nasty,
            w_nonascii,
            w_nonascii,
            0.0,
        ];
        weights[4] = 1.0 - weights.iter().sum::<f64>();
        let kinds = self.rng.choices(&[1u8, 2, 3, 4, 5], &weights, n as usize);

        let mut out = String::from("#");
        for kind in kinds {
            let c = match kind {
                1 => self.rng.choice(&['\t', ' ', ' ', ' ', ' ']),
                2 => self.rng.choice(&['#', '"', '\'', '\\']),
                3 => self.codepoint(0x80, 0xd7ff),
                4 => self.codepoint(0xe000, 0x10ffff),
                _ => self.codepoint(0x21, 0x7e),
            };
            out.push(c);
        }
        out
    }

    /// `ws-comment-newline = *( wschar / [ comment ] newline )`
    fn ws_comment_newline(&mut self) -> String {
        let n = self.rng.rand_exp(2.0, 0, 5);
        let mut out = String::new();
        for _ in 0..n {
            let r = self.rng.range(0, 5);
            if r < 4 {
                let ws = self.ws();
                out.push_str(&ws);
            }
            if r == 2 || r == 4 {
                let comment = self.comment();
                out.push_str(&comment);
            }
            if r >= 2 {
                out.push_str(self.newline());
            }
        }
        out
    }

    // -- expressions --------------------------------------------------------

    /// ```text
    /// expression = ws [comment]
    ///            / ws keyval ws [comment]
    ///            / ws table ws [comment]
    /// ```
    fn expression(&mut self, ctx: &mut Context) -> String {
        let mut doc = self.ws();
        let r = self.rng.uniform();
        if r < self.config.prob_expr_keyval {
            let kv = self.keyval(ctx);
            doc.push_str(&kv);
            let ws = self.ws();
            doc.push_str(&ws);
        } else if r < self.config.prob_expr_keyval + self.config.prob_expr_table {
            let header = self.table_header(ctx);
            doc.push_str(&header);
            let ws = self.ws();
            doc.push_str(&ws);
        }
        if self.rng.chance(self.config.prob_comment) {
            let comment = self.comment();
            doc.push_str(&comment);
        }
        doc
    }

    /// `keyval = key keyval-sep val`
    ///
    /// The key must not collide with anything already present in the active
    /// table; reusing a dotted-table prefix is encouraged.
    fn keyval(&mut self, ctx: &mut Context) -> String {
        let item_keys = ctx.active_item_keys();
        let item_prefixes = ctx.active_item_prefixes();
        let table_keys = ctx.active_subtable_keys();
        let exclude_prefix: HashSet<KeyPath> =
            item_keys.iter().chain(&table_keys).cloned().collect();
        let exclude_key: HashSet<KeyPath> = item_keys
            .iter()
            .chain(&item_prefixes)
            .chain(&table_keys)
            .cloned()
            .collect();
        let (key_str, key) =
            self.sample_key(&exclude_prefix, &exclude_key, &item_prefixes, &[]);
        let (val_str, val) = self.val();
        let ws1 = self.ws();
        let ws2 = self.ws();
        ctx.assign(&key, val);
        format!("{key_str}{ws1}={ws2}{val_str}")
    }

    /// ```text
    /// table = std-table / array-table
    /// std-table = "[" ws key ws "]"
    /// array-table = "[[" ws key ws "]]"
    /// ```
    fn table_header(&mut self, ctx: &mut Context) -> String {
        if self.rng.index(2) == 1 {
            // Array headers may not touch items or plain tables; reusing an
            // existing array key appends another element.
            let item_keys = ctx.all_item_keys();
            let table_keys = ctx.all_table_keys(None, Some(false));
            let array_keys = ctx.all_table_keys(None, Some(true));
            let exclude_prefix: HashSet<KeyPath> = item_keys.iter().cloned().collect();
            let exclude_key: HashSet<KeyPath> =
                item_keys.iter().chain(&table_keys).cloned().collect();
            let reuse_prefix: Vec<KeyPath> =
                table_keys.iter().chain(&array_keys).cloned().collect();
            let (key_str, key) =
                self.sample_key(&exclude_prefix, &exclude_key, &reuse_prefix, &array_keys);
            ctx.open_table_array(&key);
            let ws1 = self.ws();
            let ws2 = self.ws();
            format!("[[{ws1}{key_str}{ws2}]]")
        } else {
            // Standard headers may not redefine anything; promoting an
            // implicit table to defined is encouraged.
            let item_keys = ctx.all_item_keys();
            let implicit_keys = ctx.all_table_keys(Some(false), Some(false));
            let defined_keys = ctx.all_table_keys(Some(true), Some(false));
            let array_keys = ctx.all_table_keys(None, Some(true));
            let exclude_prefix: HashSet<KeyPath> = item_keys.iter().cloned().collect();
            let exclude_key: HashSet<KeyPath> = item_keys
                .iter()
                .chain(&defined_keys)
                .chain(&array_keys)
                .cloned()
                .collect();
            let reuse_prefix: Vec<KeyPath> =
                implicit_keys.iter().chain(&defined_keys).cloned().collect();
            let (key_str, key) =
                self.sample_key(&exclude_prefix, &exclude_key, &reuse_prefix, &implicit_keys);
            ctx.open_table(&key);
            let ws1 = self.ws();
            let ws2 = self.ws();
            format!("[{ws1}{key_str}{ws2}]")
        }
    }

    // -- keys ---------------------------------------------------------------

    /// Samples a dotted key satisfying the four constraint sets.
    ///
    /// With probability `prob_existing_key` an entry of `reuse_key` is
    /// re-rendered verbatim, or an entry of `reuse_prefix` seeds the prefix
    /// of a longer key. Fresh candidates are rejection-sampled against
    /// `exclude_key` (whole key) and `exclude_prefix` (any proper prefix).
    fn sample_key(
        &mut self,
        exclude_prefix: &HashSet<KeyPath>,
        exclude_key: &HashSet<KeyPath>,
        reuse_prefix: &[KeyPath],
        reuse_key: &[KeyPath],
    ) -> (String, KeyPath) {
        let mut prefix: &[String] = &[];
        if (!reuse_prefix.is_empty() || !reuse_key.is_empty())
            && self.rng.chance(self.config.prob_existing_key)
        {
            let r = self.rng.index(reuse_prefix.len() + reuse_key.len());
            if r < reuse_key.len() {
                let key = reuse_key[r].clone();
                let key_str = self.format_key(&key);
                return (key_str, key);
            }
            prefix = &reuse_prefix[r - reuse_key.len()];
        }

        let mut attempts = 0u32;
        let mut widen = 0;
        loop {
            let (mut key_str, mut key) = self.dotted_key(prefix);
            for _ in 0..widen {
                let sep = self.dot_sep();
                key_str.push_str(&sep);
                let (seg_str, seg) = self.simple_key();
                key_str.push_str(&seg_str);
                key.push(seg);
            }
            let clash = exclude_key.contains(key.as_slice())
                || (1..key.len()).any(|i| exclude_prefix.contains(&key[..i]));
            if !clash {
                return (key_str, key);
            }
            attempts += 1;
            if attempts.is_multiple_of(KEY_RETRY_LIMIT) {
                widen += 1;
            }
        }
    }

    /// `dot-sep = ws "." ws`
    fn dot_sep(&mut self) -> String {
        let a = self.ws();
        let b = self.ws();
        format!("{a}.{b}")
    }

    /// `dotted-key = simple-key 1*( dot-sep simple-key )`, with the given
    /// already-known prefix re-rendered in front.
    fn dotted_key(&mut self, prefix: &[String]) -> (String, KeyPath) {
        let mut key_str = self.format_key(prefix);
        let mut key: KeyPath = prefix.to_vec();
        let n = self.rng.range(1, self.config.max_dotted_len as i64);
        for _ in 0..n {
            if !key_str.is_empty() {
                let sep = self.dot_sep();
                key_str.push_str(&sep);
            }
            let (seg_str, seg) = self.simple_key();
            key_str.push_str(&seg_str);
            key.push(seg);
        }
        (key_str, key)
    }

    /// `simple-key = quoted-key / unquoted-key`
    fn simple_key(&mut self) -> (String, String) {
        let r = self.rng.uniform();
        if r < self.config.prob_quoted_key {
            if r < 0.5 * self.config.prob_quoted_key {
                self.basic_string()
            } else {
                self.literal_string()
            }
        } else {
            self.unquoted_key()
        }
    }

    /// `unquoted-key = 1*( ALPHA / DIGIT / "-" / "_" )`
    fn unquoted_key(&mut self) -> (String, String) {
        let n = self
            .rng
            .rand_exp(self.config.mean_key_len, 1, self.config.max_key_len as i64);
        let mut key = String::with_capacity(n as usize);
        for _ in 0..n {
            let c = if self.rng.chance(0.5) {
                self.rng.choice(b"0123456789-_") as char
            } else {
                let i = self.rng.index(52) as u8;
                if i < 26 { (b'a' + i) as char } else { (b'A' + i - 26) as char }
            };
            key.push(c);
        }
        (key.clone(), key)
    }

    /// Renders an already-known key, re-randomizing quoting per segment.
    fn format_key(&mut self, key: &[String]) -> String {
        let mut out = String::new();
        for seg in key {
            if !out.is_empty() {
                let sep = self.dot_sep();
                out.push_str(&sep);
            }
            let rendered = self.format_simple_key(seg);
            out.push_str(&rendered);
        }
        out
    }

    /// Renders a single known segment, quoting when required (or by chance)
    /// and escaping basic-string characters when required (or by chance).
    fn format_simple_key(&mut self, key: &str) -> String {
        let mut need_quote = key.is_empty();
        let mut need_basic = false;
        for c in key.chars() {
            if !is_unquoted_key_char(c) {
                need_quote = true;
            }
            if !is_literal_char(c) {
                need_basic = true;
            }
        }
        if need_quote || self.rng.chance(self.config.prob_quoted_key) {
            if need_basic || self.rng.chance(0.5) {
                let mut out = String::from("\"");
                for c in key.chars() {
                    let need_escape = !is_basic_unescaped(c);
                    let r = self.rng.uniform();
                    if need_escape || r < self.config.prob_escape_char {
                        let esc = self.escape_char(c);
                        out.push_str(&esc);
                    } else {
                        out.push(c);
                    }
                }
                out.push('"');
                out
            } else {
                format!("'{key}'")
            }
        } else {
            key.to_string()
        }
    }

    /// Emits one escape sequence for `c`: the closed single-character escape
    /// when available, else `\uXXXX` / `\UXXXXXXXX` with randomized hex case.
    fn escape_char(&mut self, c: char) -> String {
        let r = self.rng.uniform();
        if let Some(sym) = escape_symbol(c) {
            if r < 0.5 {
                return format!("\\{sym}");
            }
        }
        let code = c as u32;
        if code < 0x10000 && r < 0.9 {
            format!("\\u{}", self.rand_format_hex(code as u128, 4))
        } else {
            format!("\\U{}", self.rand_format_hex(code as u128, 8))
        }
    }

    // -- values -------------------------------------------------------------

    /// `val = string / boolean / integer / float / array / inline-table / date-time`
    fn val(&mut self) -> (String, Value) {
        match self.rng.index(7) {
            0 => {
                let (s, v) = self.string();
                (s, Value::String(v))
            }
            1 => {
                let (s, v) = self.boolean();
                (s, Value::Boolean(v))
            }
            2 => {
                let (s, v) = self.integer();
                (s, Value::Integer(v))
            }
            3 => {
                let (s, v) = self.float();
                (s, Value::Float(v))
            }
            4 => self.array(),
            5 => self.inline_table(),
            _ => {
                let (s, v) = self.date_time();
                (s, Value::Datetime(v))
            }
        }
    }

    /// `boolean = true / false`
    fn boolean(&mut self) -> (String, bool) {
        if self.rng.index(2) == 0 {
            ("true".to_string(), true)
        } else {
            ("false".to_string(), false)
        }
    }

    // -- strings ------------------------------------------------------------

    /// ```text
    /// string = ml-basic-string / basic-string
    ///        / ml-literal-string / literal-string
    /// ```
    fn string(&mut self) -> (String, String) {
        match self.rng.index(4) {
            0 => self.ml_basic_string(),
            1 => self.basic_string(),
            2 => self.ml_literal_string(),
            _ => self.literal_string(),
        }
    }

    /// `basic-string = %x22 *basic-char %x22`
    fn basic_string(&mut self) -> (String, String) {
        let n = self.rng.rand_exp(
            self.config.mean_string_len,
            0,
            self.config.max_string_len as i64,
        );
        let mut doc = String::from("\"");
        let mut val = String::new();
        for _ in 0..n {
            let (dc, vc) = self.basic_char();
            doc.push_str(&dc);
            val.push(vc);
        }
        doc.push('"');
        (doc, val)
    }

    /// One basic-string character: a closed escape, a unicode escape, or a
    /// raw character from the basic-unescaped set.
    fn basic_char(&mut self) -> (String, char) {
        let r = self.rng.uniform();
        if r < 0.5 * self.config.prob_escape_char {
            let (c, sym) = ESCAPES[self.rng.index(ESCAPES.len())];
            (format!("\\{sym}"), c)
        } else if r < self.config.prob_escape_char {
            let r = self.rng.uniform();
            let code = if r < 0.5 {
                self.rng.range(0, 0xd7ff) as u32
            } else {
                self.rng.range(0xe000, 0x10ffff) as u32
            };
            let c = char::from_u32(code).expect("codepoint avoids surrogates");
            if code < 0x10000 && r < 0.9 {
                (format!("\\u{}", self.rand_format_hex(code as u128, 4)), c)
            } else {
                (format!("\\U{}", self.rand_format_hex(code as u128, 8)), c)
            }
        } else {
            let r = self.rng.uniform();
            let c = if r < 0.1 {
                // Punctuation, with the delimiter swapped out for a tab.
                match self.codepoint(0x20, 0x2f) {
                    '"' => '\t',
                    c => c,
                }
            } else if r < 0.8 {
                match self.codepoint(0x30, 0x7e) {
                    '\\' => 'A',
                    c => c,
                }
            } else if r < 0.9 {
                self.codepoint(0x80, 0xd7ff)
            } else {
                self.codepoint(0xe000, 0x10ffff)
            };
            (c.to_string(), c)
        }
    }

    /// `literal-string = %x27 *literal-char %x27`
    fn literal_string(&mut self) -> (String, String) {
        let n = self.rng.rand_exp(
            self.config.mean_string_len,
            0,
            self.config.max_string_len as i64,
        );
        let mut val = String::with_capacity(n as usize);
        for _ in 0..n {
            val.push(self.literal_char());
        }
        (format!("'{val}'"), val)
    }

    /// `literal-char = %x09 / %x20-26 / %x28-7E / %x80-D7FF / %xE000-10FFFF`
    fn literal_char(&mut self) -> char {
        let r = self.rng.uniform();
        if r < 0.1 {
            match self.codepoint(0x20, 0x2f) {
                '\'' => '\t',
                c => c,
            }
        } else if r < 0.8 {
            self.codepoint(0x30, 0x7e)
        } else if r < 0.9 {
            self.codepoint(0x80, 0xd7ff)
        } else {
            self.codepoint(0xe000, 0x10ffff)
        }
    }

    /// Multiline basic string. Body units are basic characters, embedded
    /// newlines, line continuations and quote runs; two flags guard the
    /// grammar's restrictions (never three quotes in a row, no raw
    /// whitespace immediately after a continuation).
    fn ml_basic_string(&mut self) -> (String, String) {
        let n = self.rng.rand_exp(
            self.config.mean_ml_string_len,
            0,
            self.config.max_ml_string_len as i64,
        );
        let mut doc = String::new();
        let mut val = String::new();
        if self.rng.index(2) == 1 {
            // Trimmed by the parser; never enters the model.
            doc.push_str(self.newline());
        }
        let mut allow_quote = true;
        let mut allow_ws = true;
        for _ in 0..n {
            let r = self.rng.uniform();
            if allow_quote && r < self.config.prob_ml_quote {
                doc.push('"');
                val.push('"');
                if r < 0.5 * self.config.prob_ml_quote {
                    doc.push('"');
                    val.push('"');
                }
                allow_quote = false;
                allow_ws = true;
                continue;
            }
            allow_quote = true;
            let r = self.rng.uniform();
            if r < self.config.prob_ml_newline && !val.is_empty() && allow_ws {
                doc.push_str(self.newline());
                val.push('\n');
            } else if r < self.config.prob_ml_newline + self.config.prob_ml_escaped_newline {
                doc.push('\\');
                let ws = self.ws();
                doc.push_str(&ws);
                doc.push_str(self.newline());
                for _ in 0..self.rng.range(0, 2) {
                    let ws = self.ws();
                    doc.push_str(&ws);
                    doc.push_str(self.newline());
                }
                let ws = self.ws();
                doc.push_str(&ws);
                allow_ws = false;
            } else {
                loop {
                    let (dc, vc) = self.basic_char();
                    if allow_ws || (dc != "\t" && dc != " ") {
                        doc.push_str(&dc);
                        val.push(vc);
                        break;
                    }
                }
                allow_ws = true;
            }
        }
        (format!("\"\"\"{doc}\"\"\""), val)
    }

    /// Multiline literal string: the literal alphabet plus embedded newlines
    /// and guarded quote runs.
    fn ml_literal_string(&mut self) -> (String, String) {
        let n = self.rng.rand_exp(
            self.config.mean_ml_string_len,
            0,
            self.config.max_ml_string_len as i64,
        );
        let mut doc = String::new();
        let mut val = String::new();
        if self.rng.index(2) == 1 {
            doc.push_str(self.newline());
        }
        let mut allow_quote = true;
        for _ in 0..n {
            let r = self.rng.uniform();
            if allow_quote && r < self.config.prob_ml_quote {
                doc.push('\'');
                val.push('\'');
                if r < 0.5 * self.config.prob_ml_quote {
                    doc.push('\'');
                    val.push('\'');
                }
                allow_quote = false;
                continue;
            }
            allow_quote = true;
            let r = self.rng.uniform();
            if r < self.config.prob_ml_newline && !val.is_empty() {
                doc.push_str(self.newline());
                val.push('\n');
            } else {
                let c = self.literal_char();
                doc.push(c);
                val.push(c);
            }
        }
        (format!("'''{doc}'''"), val)
    }

    // -- numbers ------------------------------------------------------------

    /// Splits a digit run with underscores; each inter-digit gap gets one
    /// independently with probability 0.1, so `_` never leads, trails or
    /// doubles up.
    fn splice_number(&mut self, digits: &str) -> String {
        let mut out = String::with_capacity(digits.len() * 2);
        for (i, c) in digits.chars().enumerate() {
            if i > 0 && self.rng.chance(0.1) {
                out.push('_');
            }
            out.push(c);
        }
        out
    }

    /// Formats `val` in hexadecimal, at least `minwidth` digits, with the
    /// case of every alphabetic digit randomized.
    fn rand_format_hex(&mut self, mut val: u128, minwidth: usize) -> String {
        let mut digits = Vec::new();
        while digits.len() < minwidth || val > 0 {
            let d = (val % 16) as u8;
            val /= 16;
            let c = if d < 10 {
                b'0' + d
            } else if self.rng.index(2) == 0 {
                b'a' + d - 10
            } else {
                b'A' + d - 10
            };
            digits.push(c);
        }
        digits.reverse();
        String::from_utf8(digits).expect("hex digits are ASCII")
    }

    /// `integer = dec-int / hex-int / oct-int / bin-int`
    ///
    /// The magnitude is sampled log-uniformly (squared) up to
    /// `max_int_value`, biasing small values while keeping 2^80 reachable.
    fn integer(&mut self) -> (String, i128) {
        let r = self.rng.uniform();
        let magnitude = ((r * r * (self.config.max_int_value as f64 + 1.0).ln()).exp() - 1.0)
            .round() as u128;

        let (prefix, base, zero_pad, sign) = self.rng.choice(&INT_FORMS);
        let mut digits = match base {
            IntBase::Dec => magnitude.to_string(),
            IntBase::Hex => self.rand_format_hex(magnitude, 1),
            IntBase::Oct => format!("{magnitude:o}"),
            IntBase::Bin => format!("{magnitude:b}"),
        };
        if zero_pad {
            let zeros = self.rng.range(0, 3) as usize;
            digits = "0".repeat(zeros) + &digits;
        }
        let spliced = self.splice_number(&digits);
        (format!("{prefix}{spliced}"), sign * magnitude as i128)
    }

    /// Signed or unsigned decimal integer for float parts; `zero_prefixable`
    /// corresponds to TOML's `zero-prefixable-int`.
    fn dec_int(&mut self, max_val: i64, signed: bool, zero_prefixable: bool) -> (String, i64) {
        let v = self.rng.range(0, max_val);
        let sign_str = if signed {
            self.rng.choice(&["", "+", "-"])
        } else {
            ""
        };
        let digits = if zero_prefixable {
            let zeros = self.rng.range(0, 3) as usize;
            format!("{}{v}", "0".repeat(zeros))
        } else {
            v.to_string()
        };
        let spliced = self.splice_number(&digits);
        let val = if sign_str == "-" { -v } else { v };
        (format!("{sign_str}{spliced}"), val)
    }

    /// ```text
    /// float = float-int-part ( exp / frac [ exp ] )
    ///       / special-float
    /// ```
    ///
    /// The model value is the IEEE-754 conversion of the underscore-stripped
    /// text; NaN keeps the emitted sign.
    fn float(&mut self) -> (String, f64) {
        if self.rng.chance(self.config.prob_special_float) {
            let prefix = self.rng.choice(&["", "+", "-"]);
            let sym = self.rng.choice(&["inf", "nan"]);
            let mut val = if sym == "inf" { f64::INFINITY } else { f64::NAN };
            if prefix == "-" {
                val = -val;
            }
            return (format!("{prefix}{sym}"), val);
        }

        let (int_str, _) = self.dec_int(999_999, true, false);
        let r = self.rng.range(0, 2);
        let exp_str = if r == 0 || r == 2 {
            let (s, _) = self.dec_int(100, true, true);
            let e = self.rng.choice(&['e', 'E']);
            format!("{e}{s}")
        } else {
            String::new()
        };
        let frac_str = if r == 1 || r == 2 {
            let (s, _) = self.dec_int(99_999, false, true);
            format!(".{s}")
        } else {
            String::new()
        };
        let s = format!("{int_str}{frac_str}{exp_str}");
        let val: f64 = s
            .replace('_', "")
            .parse()
            .expect("generated float text is well-formed");
        (s, val)
    }

    // -- containers ---------------------------------------------------------

    /// ```text
    /// array = "[" [ array-values ] ws-comment-newline "]"
    /// ```
    fn array(&mut self) -> (String, Value) {
        let n = self.rng.rand_exp(
            self.config.mean_array_elems,
            0,
            self.config.max_array_elems as i64,
        );
        let mut doc = String::from("[");
        let mut elems = Vec::new();
        for i in 0..n {
            if i > 0 {
                let trivia = self.ws_comment_newline();
                doc.push_str(&trivia);
                doc.push(',');
            }
            let trivia = self.ws_comment_newline();
            doc.push_str(&trivia);
            let (s, v) = self.val();
            doc.push_str(&s);
            elems.push(v);
        }
        if n > 0 && self.rng.chance(0.5) {
            let trivia = self.ws_comment_newline();
            doc.push_str(&trivia);
            doc.push(',');
        }
        let trivia = self.ws_comment_newline();
        doc.push_str(&trivia);
        doc.push(']');
        (doc, Value::Array(elems))
    }

    /// `inline-table = "{" ws [ inline-table-keyvals ] ws "}"`
    ///
    /// Key uniqueness is scoped to the inline table itself; a scratch pair
    /// of item/prefix lists mirrors what [`Context`] tracks for real tables.
    fn inline_table(&mut self) -> (String, Value) {
        let n = self.rng.rand_exp(
            self.config.mean_array_elems,
            0,
            self.config.max_array_elems as i64,
        );
        let mut doc = String::from("{");
        let mut tbl = Table::new();
        let mut item_keys: Vec<KeyPath> = Vec::new();
        let mut item_prefixes: Vec<KeyPath> = Vec::new();
        for i in 0..n {
            let exclude_prefix: HashSet<KeyPath> = item_keys.iter().cloned().collect();
            let exclude_key: HashSet<KeyPath> =
                item_keys.iter().chain(&item_prefixes).cloned().collect();
            let (key_str, key) =
                self.sample_key(&exclude_prefix, &exclude_key, &item_prefixes, &[]);
            let (val_str, v) = self.val();
            if i > 0 {
                let ws = self.ws();
                doc.push_str(&ws);
                doc.push(',');
            }
            let ws = self.ws();
            doc.push_str(&ws);
            doc.push_str(&key_str);
            let ws = self.ws();
            doc.push_str(&ws);
            doc.push('=');
            let ws = self.ws();
            doc.push_str(&ws);
            doc.push_str(&val_str);

            item_keys.push(key.clone());
            for m in 1..key.len() {
                if !item_prefixes.iter().any(|p| p.as_slice() == &key[..m]) {
                    item_prefixes.push(key[..m].to_vec());
                }
            }

            let mut sub = &mut tbl;
            for seg in &key[..key.len() - 1] {
                if !sub.contains_key(seg) {
                    sub.insert(seg.clone(), Value::Table(Table::new()));
                }
                sub = match sub.get_mut(seg).expect("segment just ensured") {
                    Value::Table(t) => t,
                    _ => unreachable!("inline-table prefix reaches a value"),
                };
            }
            sub.insert(key.last().expect("key is never empty").clone(), v);
        }
        let ws = self.ws();
        doc.push_str(&ws);
        doc.push('}');
        (doc, Value::Table(tbl))
    }

    // -- date-times ---------------------------------------------------------

    /// `date-time = offset-date-time / local-date-time / local-date / local-time`
    fn date_time(&mut self) -> (String, Datetime) {
        match self.rng.index(4) {
            0 => self.offset_date_time(),
            1 => self.local_date_time(),
            2 => {
                let (s, d) = self.local_date();
                (s, Datetime::LocalDate(d))
            }
            _ => {
                let (s, t) = self.local_time();
                (s, Datetime::LocalTime(t))
            }
        }
    }

    fn offset_date_time(&mut self) -> (String, Datetime) {
        let (date_str, date) = self.local_date();
        let (time_str, time) = self.local_time();
        let (tz_str, offset) = self.timezone();
        let delim = self.rng.choice(&['T', 't', ' ']);
        (
            format!("{date_str}{delim}{time_str}{tz_str}"),
            Datetime::Offset { date, time, offset },
        )
    }

    fn local_date_time(&mut self) -> (String, Datetime) {
        let (date_str, date) = self.local_date();
        let (time_str, time) = self.local_time();
        let delim = self.rng.choice(&['T', 't', ' ']);
        (
            format!("{date_str}{delim}{time_str}"),
            Datetime::Local { date, time },
        )
    }

    /// `full-date = 4DIGIT "-" 2DIGIT "-" 2DIGIT`, always a real Gregorian
    /// calendar day.
    fn local_date(&mut self) -> (String, Date) {
        let year = self.rng.range(1000, 9999) as u16;
        let month = self.rng.range(1, 12) as u8;
        let day = self.rng.range(1, time::days_in_month(year, month) as i64) as u8;
        let date = Date { year, month, day };
        (date.to_string(), date)
    }

    /// `partial-time = 2DIGIT ":" 2DIGIT ":" 2DIGIT ["." 1*DIGIT]`
    ///
    /// Half the time the fractional tail is all zeros (model value 0, any
    /// of 1-6 digits); otherwise a microsecond count truncated to a random
    /// precision and formatted canonically.
    fn local_time(&mut self) -> (String, Time) {
        let hour = self.rng.range(0, 23) as u8;
        let minute = self.rng.range(0, 59) as u8;
        let second = self.rng.range(0, 59) as u8;
        let (microsecond, zero_frac) = if self.rng.chance(0.5) {
            let digits = self.rng.range(1, 6) as usize;
            (0, digits)
        } else {
            let r = self.rng.range(0, 6) as u32;
            let u = self.rng.range(0, 999_999) as u32;
            (u - u % 10u32.pow(r), 0)
        };
        let time = Time {
            hour,
            minute,
            second,
            microsecond,
        };
        let mut doc = time.to_string();
        if zero_frac > 0 {
            doc.push('.');
            doc.push_str(&"0".repeat(zero_frac));
        }
        (doc, time)
    }

    /// `time-offset = "Z" / ( "+" / "-" ) 2DIGIT ":" 2DIGIT`
    fn timezone(&mut self) -> (String, TimeOffset) {
        if self.rng.chance(0.2) {
            return ("Z".to_string(), TimeOffset::Z);
        }
        // Nonzero total minutes in [-1439, 1439], folded from one draw.
        let r = self.rng.range(1, 2 * (24 * 60 - 1));
        let minutes = if r <= 24 * 60 - 1 {
            r as i16
        } else {
            (24 * 60 - 1) as i16 - r as i16
        };
        let offset = TimeOffset::Custom { minutes };
        (offset.to_string(), offset)
    }
}
