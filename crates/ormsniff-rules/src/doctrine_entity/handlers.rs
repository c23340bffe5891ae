//! Per-member validation: schema checks followed by the handler for each
//! annotation kind.

use super::attribute_parser::{AttributeMap, AttributeValue, Dialect};
use super::cache::FileCache;
use super::extractor::{AnnotationTag, MemberAnnotations};
use super::inference::{infer_defaults, suggest_type};
use super::method_contract::{MethodContract, MethodRole, ReturnExpectation};
use super::naming::{camel_case, short_class_name, singularize, ucfirst, under_score};
use super::reference::AnnotationKind;
use super::schema;
use super::types::is_same_type;
use super::DoctrineEntitySniff;
use ormsniff_core::{PhpFile, SniffContext, TokenKind};
use tracing::{trace, warn};

const COLLECTION_INITIALIZER: &str = "new arraycollection()";

/// State for validating one member variable.
pub(super) struct MemberCheck<'a, 'f> {
    pub(super) sniff: &'a DoctrineEntitySniff,
    pub(super) ctx: &'a mut SniffContext<'f>,
    pub(super) cache: &'a mut FileCache,
    pub(super) file: &'f PhpFile,
    pub(super) member: usize,
    pub(super) annotations: MemberAnnotations,
    pub(super) member_type: Option<String>,
    pub(super) var_name: String,
    pub(super) tag_start: usize,
}

impl<'a, 'f> MemberCheck<'a, 'f> {
    pub(super) fn new(
        sniff: &'a DoctrineEntitySniff,
        ctx: &'a mut SniffContext<'f>,
        cache: &'a mut FileCache,
        member: usize,
        annotations: MemberAnnotations,
    ) -> Self {
        let file = ctx.file();
        let member_type = file.member_properties(member).type_hint;
        let var_name = file.tokens()[member].content.trim_start_matches('$').to_string();
        Self {
            sniff,
            ctx,
            cache,
            file,
            member,
            annotations,
            member_type,
            var_name,
            tag_start: member,
        }
    }

    /// Reports unless the member's doc comment suppresses `code`.
    pub(super) fn report(&mut self, message: String, ptr: usize, code: &str) {
        if self.annotations.ignore.contains(code) {
            trace!(code, "suppressed");
            return;
        }
        self.ctx.add_error(message, ptr, code);
    }

    fn report_fixable(&mut self, message: String, ptr: usize, code: &str) -> bool {
        if self.annotations.ignore.contains(code) {
            trace!(code, "suppressed");
            return false;
        }
        self.ctx.add_fixable_error(message, ptr, code)
    }

    /// Validates every annotation of the member.
    pub(super) fn run(mut self) {
        let tags = self.annotations.tags.clone();

        for tag in &tags {
            for issue in &tag.issues {
                self.report(issue.message.clone(), tag.position, issue.kind.code());
            }
        }

        let present = self.annotations.kinds();
        for tag in &tags {
            self.tag_start = tag.position;
            self.process_tag(tag, &present);
        }
    }

    fn process_tag(&mut self, tag: &AnnotationTag, present: &[AnnotationKind]) {
        let attributes = match &self.member_type {
            Some(member_type) => infer_defaults(tag.kind, &tag.attributes, member_type),
            None => tag.attributes.clone(),
        };

        for issue in schema::validate(tag.kind, &attributes, present) {
            self.report(issue.message, self.tag_start, issue.code);
        }

        match tag.kind {
            AnnotationKind::Column => self.column(tag, &attributes),
            AnnotationKind::JoinColumn => self.join_column(tag, &attributes),
            kind if kind.is_to_one() => self.relation_to_one(kind, &attributes),
            kind if kind.is_to_many() => self.relation_to_many(kind, &attributes),
            _ => {}
        }
    }

    /// Short class name, with `self` resolved to the entity class.
    fn short_class(&mut self, class_name: &str) -> String {
        match short_class_name(class_name) {
            "self" => self.cache.class_name(self.file, self.member).to_string(),
            short => short.to_string(),
        }
    }

    fn column(&mut self, tag: &AnnotationTag, attributes: &AttributeMap) {
        let var = self.var_name.clone();

        if let Some(value) = attributes.get("name") {
            let raw = value.to_string();
            let column = raw.trim_matches('`');
            let expected = under_score(&var);
            if column != expected
                && var != camel_case(column)
                && self.report_fixable(
                    format!(
                        "Column name must be underscored variable name; expected \"{expected}\" but found \"{column}\""
                    ),
                    self.tag_start,
                    "ColumnUnderscored",
                )
            {
                self.fix_literal(tag, "name", &raw, &expected);
            }
        }

        let mut expected_type = self
            .member_type
            .as_deref()
            .map(|t| t.trim_start_matches('?').to_string());

        if let Some(type_value) = attributes.get("type") {
            let column_type = match attributes.get("enumType") {
                Some(enum_type) => self.short_class(&enum_type.to_string()),
                None => type_value.to_string(),
            };
            let suggested = suggest_type(&column_type, self.sniff.use_dynamical_calculation_for_enum_column_type);

            if !suggested.is_empty() {
                self.check_declared_types(&suggested);
            }

            if column_type == "varchar" && !attributes.contains("length") {
                self.report(
                    "Column of type varchar must have specified length".into(),
                    self.tag_start,
                    "ColumnAttributeRequired",
                );
            }
            if column_type == "decimal" && !(attributes.contains("precision") && attributes.contains("scale")) {
                self.report(
                    "Column of type decimal must have specified precision and length".into(),
                    self.tag_start,
                    "ColumnAttributeRequired",
                );
            }
            expected_type = Some(suggested);
        }

        let expected_type = expected_type.filter(|t| !t.is_empty());
        let nullable = attributes.get("nullable").is_some_and(AttributeValue::is_truthy);

        let mut getter = MethodContract::new(AnnotationKind::Column, MethodRole::Getter, format!("get{}", ucfirst(&var)));
        if let Some(expected) = &expected_type {
            getter = getter.returns(ReturnExpectation::Type(expected.clone()));
        }
        self.validate_method(&getter);

        let setter = MethodContract::new(AnnotationKind::Column, MethodRole::Setter, format!("set{}", ucfirst(&var)))
            .required(!self.annotations.has(AnnotationKind::GeneratedValue))
            .returns(ReturnExpectation::Fluent)
            .argument(var, expected_type, nullable);
        self.validate_method(&setter);
    }

    /// Compares the `@var` type and the native property type with the type
    /// the column holds.
    fn check_declared_types(&mut self, expected: &str) {
        let var_type = self.annotations.var_type.clone();
        let member_type = self.member_type.clone();

        if var_type.is_none() && member_type.is_none() {
            self.report(
                format!("Variable type required for column; expected \"{expected}\""),
                self.tag_start,
                "VariableTypeRequired",
            );
        }
        if let Some(var_type) = var_type.filter(|t| !is_same_type(expected, t)) {
            self.report(
                format!("Variable type must match column type; expected \"{expected}\" but found \"{var_type}\""),
                self.tag_start,
                "VariableTypeMismatch",
            );
        }
        if let Some(member_type) = member_type.filter(|t| !is_same_type(expected, t.trim_matches('?'))) {
            self.report(
                format!("Property type must match column type; expected \"{expected}\" but found \"{member_type}\""),
                self.tag_start,
                "PropertyTypeMismatch",
            );
        }
    }

    fn join_column(&mut self, tag: &AnnotationTag, attributes: &AttributeMap) {
        let Some(value) = attributes.get("name") else {
            return;
        };
        let name = value.to_string();
        let expected = format!("{}_id", under_score(&self.var_name));
        if name != expected
            && self.report_fixable(
                format!(
                    "JoinColumn name must be underscored variable name; expected \"{expected}\" but found \"{name}\""
                ),
                self.tag_start,
                "JoinColumnNameFormat",
            )
        {
            self.fix_literal(tag, "name", &name, &expected);
        }
    }

    fn relation_to_one(&mut self, kind: AnnotationKind, attributes: &AttributeMap) {
        let Some(target) = attributes.get("targetEntity") else {
            trace!(annotation = %kind, "no target entity");
            return;
        };
        let target = self.short_class(&target.to_string());
        let nullable = self
            .annotations
            .first(AnnotationKind::JoinColumn)
            .and_then(|join| join.attributes.get("nullable"))
            .map_or(true, AttributeValue::is_truthy);
        let var = self.var_name.clone();

        let getter = MethodContract::new(kind, MethodRole::Getter, format!("get{}", ucfirst(&var)))
            .returns(ReturnExpectation::Type(target.clone()));
        self.validate_method(&getter);

        let setter = MethodContract::new(kind, MethodRole::Setter, format!("set{}", ucfirst(&var)))
            .returns(ReturnExpectation::Fluent)
            .argument(var, Some(target), nullable);
        self.validate_method(&setter);
    }

    fn relation_to_many(&mut self, kind: AnnotationKind, attributes: &AttributeMap) {
        let var = self.var_name.clone();
        let singular = singularize(&var).unwrap_or_else(|| {
            self.report(
                format!("Variable \"{kind}\" name \"{var}\" must be plural"),
                self.member,
                &format!("{kind}VariablePlural"),
            );
            var.clone()
        });

        let (members, constructor_missing) = self.cache.initialized_members(self.file);
        let initializer = members.get(&var).cloned();
        if constructor_missing {
            self.report(
                "Class should have constructor with properties initialization.".into(),
                self.member,
                "ConstructorRequired",
            );
        }
        match initializer {
            None => self.report(
                format!("Variable \"{var}\" must be initialized in the class constructor"),
                self.member,
                &format!("{kind}VariableNotInitialized"),
            ),
            Some(value) if value.trim().to_lowercase() != COLLECTION_INITIALIZER => self.report(
                format!(
                    "Variable \"{var}\" must be initialized in the class constructor as ArrayCollection; found \"{value}\""
                ),
                self.member,
                &format!("{kind}VariableCollection"),
            ),
            Some(_) => {}
        }

        let Some(target) = attributes.get("targetEntity") else {
            trace!(annotation = %kind, "no target entity");
            return;
        };
        let target = self.short_class(&target.to_string());

        let adder = MethodContract::new(kind, MethodRole::Adder, format!("add{}", ucfirst(&singular)))
            .returns(ReturnExpectation::Fluent)
            .argument(singular.clone(), Some(target.clone()), false);
        self.validate_method(&adder);

        let remover = MethodContract::new(kind, MethodRole::Remover, format!("remove{}", ucfirst(&singular)))
            .argument(singular, Some(target.clone()), false);
        self.validate_method(&remover);

        let getter = MethodContract::new(kind, MethodRole::Getter, format!("get{}", ucfirst(&var))).returns(
            ReturnExpectation::Type(format!(
                "{target}[]|Collection|ArrayCollection|Collection<{target}>|Collection<int, {target}>"
            )),
        );
        self.validate_method(&getter);
    }

    /// Rewrites the `attribute` literal of `tag` from `raw` to `expected`.
    fn fix_literal(&mut self, tag: &AnnotationTag, attribute: &str, raw: &str, expected: &str) {
        let tokens = self.file.tokens();
        let edit = match tag.dialect {
            Dialect::DocComment => tag
                .span
                .clone()
                .filter(|&i| tokens[i].kind == TokenKind::DocCommentString)
                .find_map(|i| replace_doc_literal(&tokens[i].content, attribute, raw, expected).map(|text| (i, text))),
            Dialect::Native => {
                native_literal(self.file, tag, attribute).map(|i| (i, format!("'{expected}'")))
            }
        };
        let Some((ptr, text)) = edit else {
            trace!(tag = %tag.name, attribute, "literal not found for fix");
            return;
        };
        if let Err(err) = self.ctx.fixer().changeset(|fixer| fixer.replace_token(ptr, text)) {
            warn!(error = %err, tag = %tag.name, "name fix rejected");
        }
    }
}

/// Replaces the quoted value of `attribute="raw"` in a doc comment line.
fn replace_doc_literal(text: &str, attribute: &str, raw: &str, expected: &str) -> Option<String> {
    for (at, _) in text.match_indices(attribute) {
        let standalone = text[..at]
            .chars()
            .next_back()
            .map_or(true, |c| !(c.is_ascii_alphanumeric() || c == '_'));
        let Some(value) = text[at + attribute.len()..]
            .trim_start_matches(' ')
            .strip_prefix('=')
            .map(|rest| rest.trim_start_matches(' '))
            .and_then(|rest| rest.strip_prefix('"'))
        else {
            continue;
        };
        if standalone && value.starts_with(raw) && value[raw.len()..].starts_with('"') {
            let start = text.len() - value.len();
            return Some(format!("{}{expected}{}", &text[..start], &text[start + raw.len()..]));
        }
    }
    None
}

/// String token holding the value of `attribute:` inside a native attribute.
fn native_literal(file: &PhpFile, tag: &AnnotationTag, attribute: &str) -> Option<usize> {
    let tokens = file.tokens();
    let end = tag.span.end;
    tag.span.clone().find_map(|i| {
        if tokens[i].kind != TokenKind::String || tokens[i].content != attribute {
            return None;
        }
        let colon = file.find_next_non_empty(i + 1, Some(end))?;
        if tokens[colon].kind != TokenKind::Colon {
            return None;
        }
        let value = file.find_next_non_empty(colon + 1, Some(end))?;
        (tokens[value].kind == TokenKind::ConstantEncapsedString).then_some(value)
    })
}
