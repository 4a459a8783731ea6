use rustc_hash::FxHashMap;

/// Prefix trie over the schema's operator set, for greedy longest-match of
/// multi-character operators in O(length of the match).
#[derive(Debug, Default)]
pub(crate) struct OperatorTrie {
    root: TrieNode,
}

#[derive(Debug, Default)]
struct TrieNode {
    children: FxHashMap<char, TrieNode>,
    terminal: bool,
}

impl OperatorTrie {
    pub(crate) fn new<S: AsRef<str>>(operators: &[S]) -> OperatorTrie {
        let mut trie = OperatorTrie::default();
        for op in operators {
            let mut node = &mut trie.root;
            for c in op.as_ref().chars() {
                node = node.children.entry(c).or_default();
            }
            node.terminal = true;
        }
        trie
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.root.children.is_empty()
    }

    /// Length in characters of the longest operator that prefixes `chars`.
    pub(crate) fn longest_match(&self, chars: impl Iterator<Item = char>) -> Option<usize> {
        let mut node = &self.root;
        let mut best = None;
        for (i, c) in chars.enumerate() {
            match node.children.get(&c) {
                Some(next) => {
                    node = next;
                    if node.terminal {
                        best = Some(i + 1);
                    }
                }
                None => break,
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_longest_match_is_greedy() {
        let trie = OperatorTrie::new(&["=", "==", "=>"]);
        assert_eq!(trie.longest_match("==".chars()), Some(2));
        assert_eq!(trie.longest_match("=>x".chars()), Some(2));
        assert_eq!(trie.longest_match("=x".chars()), Some(1));
        assert_eq!(trie.longest_match("x".chars()), None);
    }

    #[test]
    fn test_prefix_without_terminal() {
        let trie = OperatorTrie::new(&["->"]);
        assert_eq!(trie.longest_match("-x".chars()), None);
        assert_eq!(trie.longest_match("->".chars()), Some(2));
        assert_eq!(trie.is_empty(), false);
        assert_eq!(OperatorTrie::new::<&str>(&[]).is_empty(), true);
    }
}
