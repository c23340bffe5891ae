//! Facts about the file under analysis that several members share.
//!
//! A [`FileCache`] is built for one file and dropped with it; every field is
//! filled on first use.

use ormsniff_core::{PhpFile, TokenKind};
use std::collections::HashMap;
use tracing::debug;

const CONSTRUCTOR: &str = "__construct";

/// Lazily computed per-file lookups.
#[derive(Debug, Default)]
pub struct FileCache {
    methods: Option<Vec<(usize, String)>>,
    class_name: Option<String>,
    initialized: Option<HashMap<String, String>>,
}

impl FileCache {
    /// Creates an empty cache for `file`.
    #[must_use]
    pub fn new(file: &PhpFile) -> Self {
        debug!(file = %file.path().display(), "new entity cache");
        Self::default()
    }

    /// Named functions in the file as `(function token, name)`.
    pub fn methods(&mut self, file: &PhpFile) -> &[(usize, String)] {
        self.methods.get_or_insert_with(|| {
            file.tokens()
                .iter()
                .enumerate()
                .filter(|(_, t)| t.kind == TokenKind::Function)
                .filter_map(|(i, _)| file.declaration_name(i).map(|name| (i, name.to_string())))
                .collect()
        })
    }

    /// `function` token of the first method called `name`.
    pub fn find_method(&mut self, file: &PhpFile, name: &str) -> Option<usize> {
        self.methods(file)
            .iter()
            .find(|(_, method)| method == name)
            .map(|&(ptr, _)| ptr)
    }

    /// Name of the outermost class-like declaration around `ptr`, resolved
    /// once per file.
    pub fn class_name(&mut self, file: &PhpFile, ptr: usize) -> &str {
        self.class_name.get_or_insert_with(|| {
            file.tokens()
                .get(ptr)
                .and_then(|t| t.conditions.first())
                .filter(|(_, kind)| {
                    matches!(kind, TokenKind::Class | TokenKind::Interface | TokenKind::Trait)
                })
                .and_then(|&(owner, _)| file.declaration_name(owner))
                .unwrap_or_default()
                .to_string()
        })
    }

    /// Properties assigned in the constructor as `name => value text`.
    ///
    /// The flag is `true` on the call that first finds the constructor
    /// missing, and `false` afterwards.
    pub fn initialized_members(&mut self, file: &PhpFile) -> (&HashMap<String, String>, bool) {
        let mut missing_now = false;
        if self.initialized.is_none() {
            let constructor = self.find_method(file, CONSTRUCTOR);
            missing_now = constructor.is_none();
            let members = constructor.map(|ptr| constructor_assignments(file, ptr)).unwrap_or_default();
            debug!(members = members.len(), missing_constructor = missing_now, "read constructor");
            self.initialized = Some(members);
        }
        (self.initialized.get_or_insert_with(HashMap::new), missing_now)
    }
}

/// `$this->name = value;` statements in the body of `constructor`.
fn constructor_assignments(file: &PhpFile, constructor: usize) -> HashMap<String, String> {
    let tokens = file.tokens();
    let mut members = HashMap::new();
    let (Some(open), Some(close)) = (tokens[constructor].scope_opener, tokens[constructor].scope_closer) else {
        return members;
    };

    let mut cursor = open;
    while let Some(this) = file.find_next_with_content(&[TokenKind::Variable], cursor + 1, Some(close), "$this") {
        cursor = this;
        let Some(end) = file.find_next(&[TokenKind::Semicolon], this + 1, None, false) else {
            break;
        };
        let assignment = file
            .find_next(&[TokenKind::ObjectOperator], this + 1, Some(end), false)
            .and_then(|arrow| file.find_next(&[TokenKind::String], arrow + 1, Some(end), false))
            .and_then(|name| {
                let equal = file.find_next(&[TokenKind::Equal], name + 1, Some(end), false)?;
                let value = file.find_next(&[TokenKind::Whitespace], equal + 1, Some(end), true)?;
                Some((name, value))
            });
        if let Some((name, value)) = assignment {
            members.insert(
                tokens[name].content.clone(),
                file.tokens_as_string(value, end - value),
            );
        }
    }
    members
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOURCE: &str = r"<?php
class Post
{
    private $comments;
    private $tags;

    public function __construct()
    {
        $this->comments = new ArrayCollection();
        $this->tags = [];
        $local = 1;
    }

    public function getComments()
    {
        return $this->comments;
    }
}
";

    #[test]
    fn test_methods_and_class_name() {
        let file = PhpFile::parse("Post.php", SOURCE).unwrap();
        let mut cache = FileCache::new(&file);
        let names: Vec<&str> = cache.methods(&file).iter().map(|(_, n)| n.as_str()).collect();
        assert_eq!(names, vec!["__construct", "getComments"]);

        let getter = cache.find_method(&file, "getComments").unwrap();
        assert_eq!(file.tokens()[getter].kind, TokenKind::Function);
        assert_eq!(cache.class_name(&file, getter), "Post");
        assert!(cache.find_method(&file, "setComments").is_none());
    }

    #[test]
    fn test_initialized_members() {
        let file = PhpFile::parse("Post.php", SOURCE).unwrap();
        let mut cache = FileCache::new(&file);
        let (members, missing) = cache.initialized_members(&file);
        assert!(!missing);
        assert_eq!(members.get("comments").map(String::as_str), Some("new ArrayCollection()"));
        assert_eq!(members.get("tags").map(String::as_str), Some("[]"));
        assert_eq!(members.len(), 2);
    }

    #[test]
    fn test_missing_constructor_reported_once() {
        let file = PhpFile::parse("Tag.php", "<?php\nclass Tag\n{\n    private $posts;\n}\n").unwrap();
        let mut cache = FileCache::new(&file);
        assert!(cache.initialized_members(&file).1);
        assert!(!cache.initialized_members(&file).1);
    }
}
