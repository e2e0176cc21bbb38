/// Splits one line into columns.
///
/// With `handle_quotes` a column may be wrapped in double quotes, inside which
/// the delimiter is literal and `""` stands for one quote. Never fails: an
/// unterminated quote simply runs to the end of the line, and an empty line
/// yields a single empty column.
pub fn tokenize(line: &str, delimiter: char, handle_quotes: bool) -> Vec<String> {
    if !handle_quotes {
        return line.split(delimiter).map(String::from).collect();
    }

    let mut columns = Vec::new();
    let mut current = String::new();
    let mut state = QuoteState::Plain;

    for ch in line.chars() {
        match state {
            QuoteState::Plain => {
                if ch == delimiter {
                    columns.push(std::mem::take(&mut current));
                } else if ch == QUOTE && current.is_empty() {
                    state = QuoteState::Quoted;
                } else {
                    current.push(ch);
                }
            }
            QuoteState::Quoted => {
                if ch == QUOTE {
                    state = QuoteState::MaybeClosed;
                } else {
                    current.push(ch);
                }
            }
            QuoteState::MaybeClosed => {
                if ch == QUOTE {
                    current.push(QUOTE);
                    state = QuoteState::Quoted;
                } else if ch == delimiter {
                    columns.push(std::mem::take(&mut current));
                    state = QuoteState::Plain;
                } else {
                    current = rewrap_malformed(&current, ch);
                    state = QuoteState::Plain;
                }
            }
        }
    }

    columns.push(current);
    columns
}

const QUOTE: char = '"';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum QuoteState {
    Plain,
    Quoted,
    /// A quote closed the span; expecting a delimiter or an escaped quote.
    MaybeClosed,
}

/// A closing quote followed by text: put the quotes back around what was read
/// and keep going in plain mode. Only the first embedded quote is re-escaped.
fn rewrap_malformed(column: &str, next: char) -> String {
    let mut rebuilt = String::with_capacity(column.len() + 4);
    rebuilt.push(QUOTE);
    rebuilt.push_str(&column.replacen(QUOTE, "\"\"", 1));
    rebuilt.push(QUOTE);
    rebuilt.push(next);
    rebuilt
}
