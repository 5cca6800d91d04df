/// Value of a named pass-through flag
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlagValue {
    Bool(bool),
    Text(String),
}

/// Arguments forwarded verbatim to every test command.
///
/// Parsing follows the usual `--key=value` / `--key value` / `--no-key`
/// conventions; rendering appends positionals first, then the named flags in
/// the order they were first seen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TestArgs {
    pub positional: Vec<String>,
    pub named: Vec<(String, FlagValue)>,
}

impl TestArgs {
    pub fn parse<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tokens: Vec<String> = tokens.into_iter().map(Into::into).collect();
        let mut args = Self::default();
        let mut iter = tokens.into_iter().peekable();

        while let Some(token) = iter.next() {
            if token == "--" {
                args.positional.extend(iter.by_ref());
                break;
            }

            if let Some(long) = token.strip_prefix("--") {
                if let Some((key, value)) = long.split_once('=') {
                    args.set(key, FlagValue::Text(value.to_string()));
                } else if let Some(key) = long.strip_prefix("no-") {
                    args.set(key, FlagValue::Bool(false));
                } else if let Some(value) = iter.next_if(|next| !next.starts_with('-')) {
                    args.set(long, FlagValue::Text(value));
                } else {
                    args.set(long, FlagValue::Bool(true));
                }
                continue;
            }

            let letters: Vec<char> = token.strip_prefix('-').unwrap_or_default().chars().collect();
            if let Some((last, rest)) = letters.split_last() {
                for letter in rest {
                    args.set(&letter.to_string(), FlagValue::Bool(true));
                }
                match iter.next_if(|next| !next.starts_with('-')) {
                    Some(value) => args.set(&last.to_string(), FlagValue::Text(value)),
                    None => args.set(&last.to_string(), FlagValue::Bool(true)),
                }
                continue;
            }

            args.positional.push(token);
        }

        args
    }

    pub fn is_empty(&self) -> bool {
        self.positional.is_empty() && self.named.is_empty()
    }

    /// Renders the arguments as they are appended to the test command
    pub fn render(&self) -> String {
        let mut parts: Vec<String> = self.positional.clone();

        for (key, value) in &self.named {
            match value {
                FlagValue::Text(text) => parts.push(format!("--{key}={text}")),
                FlagValue::Bool(true) => parts.push(format!("--{key}")),
                FlagValue::Bool(false) => {}
            }
        }

        parts.join(" ")
    }

    fn set(&mut self, key: &str, value: FlagValue) {
        match self.named.iter_mut().find(|(existing, _)| existing == key) {
            Some(slot) => slot.1 = value,
            None => self.named.push((key.to_string(), value)),
        }
    }
}
