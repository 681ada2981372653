/// `LIKE '%' || q || '%'` over a customer's full name, with Unicode case folding.
///
/// `%` in the query matches any run of characters and `_` exactly one; neither
/// can be escaped.
#[derive(Clone, Debug)]
pub(crate) struct NamePattern {
    pattern: Vec<char>,
}

impl NamePattern {
    pub(crate) fn new(search_name: &str) -> Self {
        let mut pattern = vec!['%'];
        pattern.extend(search_name.to_lowercase().chars());
        pattern.push('%');
        Self { pattern }
    }

    pub(crate) fn matches(&self, full_name: &str) -> bool {
        let text: Vec<char> = full_name.to_lowercase().chars().collect();
        like(&self.pattern, &text)
    }
}

fn like(pattern: &[char], text: &[char]) -> bool {
    let (mut p, mut t) = (0, 0);
    // Position of the last `%` seen and the text index it is currently absorbing up to.
    let mut backtrack: Option<(usize, usize)> = None;

    while t < text.len() {
        match pattern.get(p) {
            Some('%') => {
                backtrack = Some((p, t));
                p += 1;
            }
            Some(&c) if c == '_' || c == text[t] => {
                p += 1;
                t += 1;
            }
            _ => match backtrack {
                Some((star, absorbed)) => {
                    backtrack = Some((star, absorbed + 1));
                    p = star + 1;
                    t = absorbed + 1;
                }
                None => return false,
            },
        }
    }

    pattern[p..].iter().all(|c| *c == '%')
}
