use std::fmt;

#[derive(Clone, PartialEq, Eq)]
pub struct Command {
    pub name: String,
    pub args: Vec<Vec<u8>>,
}

impl Command {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(
        mut self,
        arg: impl AsRef<[u8]>,
    ) -> Self {
        self.args.push(arg.as_ref().to_vec());
        self
    }

    pub fn args<I, A>(
        mut self,
        args: I,
    ) -> Self
    where
        I: IntoIterator<Item = A>,
        A: AsRef<[u8]>,
    {
        self.args.extend(args.into_iter().map(|a| a.as_ref().to_vec()));
        self
    }

    /// Argument `index` as UTF-8, if present and valid
    pub fn arg_str(
        &self,
        index: usize,
    ) -> Option<&str> {
        self.args.get(index).and_then(|a| std::str::from_utf8(a).ok())
    }

    pub fn is(
        &self,
        name: &str,
    ) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }
}

/// Artifacts are large binary blobs; only their size is worth printing.
impl fmt::Debug for Command {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let args: Vec<String> = self
            .args
            .iter()
            .map(|a| match std::str::from_utf8(a) {
                Ok(s) if s.len() <= 128 => format!("{s:?}"),
                _ => format!("<{} bytes>", a.len()),
            })
            .collect();
        write!(f, "{} {}", self.name, args.join(" "))
    }
}
