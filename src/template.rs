//! Command templating for compile and run commands.
//!
//! A template is an argv vector whose tokens may contain the named
//! placeholders `__filename__`, `__exec__` and `__class__`. Instantiation
//! substitutes the values from a [`TemplateContext`] and yields the final
//! argv; the first element is the program, the rest are arguments.
//!
//! Templates are split on raw whitespace, so there is no quoting support.
//! The context therefore rejects placeholder values containing whitespace
//! up front instead of letting them silently mis-split later.

use crate::error::TemplateError;

const FILENAME: &str = "__filename__";
const EXEC: &str = "__exec__";
const CLASS: &str = "__class__";

/// Values substituted into command templates, derived from the submitted
/// source file name.
#[derive(Debug, Clone)]
pub struct TemplateContext {
    file: String,
    exec_name: String,
    class_name: Option<String>,
}

impl TemplateContext {
    /// Build a context for a source file name. The exec name is the file
    /// name without its extension; the class name stays unset until a
    /// class-file language has been compiled.
    pub fn for_source(file_name: &str) -> Result<Self, TemplateError> {
        reject_whitespace(file_name)?;
        let exec_name = match file_name.rsplit_once('.') {
            Some((stem, _)) if !stem.is_empty() => stem.to_string(),
            _ => file_name.to_string(),
        };
        Ok(Self {
            file: file_name.to_string(),
            exec_name,
            class_name: None,
        })
    }

    pub fn file(&self) -> &str {
        &self.file
    }

    pub fn exec_name(&self) -> &str {
        &self.exec_name
    }

    pub fn class_name(&self) -> Option<&str> {
        self.class_name.as_deref()
    }

    /// Record the class name recovered from build output.
    pub fn set_class_name(&mut self, name: &str) -> Result<(), TemplateError> {
        reject_whitespace(name)?;
        self.class_name = Some(name.to_string());
        Ok(())
    }
}

fn reject_whitespace(value: &str) -> Result<(), TemplateError> {
    if value.is_empty() || value.contains(char::is_whitespace) {
        return Err(TemplateError::WhitespaceValue(value.to_string()));
    }
    Ok(())
}

/// A parsed command template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandTemplate {
    tokens: Vec<String>,
}

impl CommandTemplate {
    /// Split a template string into tokens. At least one token (the
    /// program) is required.
    pub fn parse(template: &str) -> Result<Self, TemplateError> {
        let tokens: Vec<String> = template.split_whitespace().map(str::to_string).collect();
        if tokens.is_empty() {
            return Err(TemplateError::EmptyTemplate);
        }
        Ok(Self { tokens })
    }

    /// Substitute the context into every token and return the argv.
    pub fn instantiate(&self, ctx: &TemplateContext) -> Result<Vec<String>, TemplateError> {
        self.instantiate_with_args(ctx, &[])
    }

    /// Like [`Self::instantiate`], with extra positional arguments
    /// appended after the templated tokens. The extras are passed through
    /// as whole argv elements, so they may contain any characters.
    pub fn instantiate_with_args(
        &self,
        ctx: &TemplateContext,
        extra: &[String],
    ) -> Result<Vec<String>, TemplateError> {
        let mut argv = Vec::with_capacity(self.tokens.len() + extra.len());
        for token in &self.tokens {
            let mut token = token.replace(FILENAME, ctx.file());
            token = token.replace(EXEC, ctx.exec_name());
            if token.contains(CLASS) {
                let class = ctx
                    .class_name()
                    .ok_or(TemplateError::UnresolvedClassName)?;
                token = token.replace(CLASS, class);
            }
            argv.push(token);
        }
        argv.extend(extra.iter().cloned());
        Ok(argv)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_derives_exec_name() {
        let ctx = TemplateContext::for_source("main.cpp").unwrap();
        assert_eq!(ctx.file(), "main.cpp");
        assert_eq!(ctx.exec_name(), "main");
        assert_eq!(ctx.class_name(), None);
    }

    #[test]
    fn test_context_without_extension() {
        let ctx = TemplateContext::for_source("Makefile").unwrap();
        assert_eq!(ctx.exec_name(), "Makefile");
    }

    #[test]
    fn test_context_rejects_whitespace() {
        match TemplateContext::for_source("my file.cpp") {
            Err(TemplateError::WhitespaceValue(value)) => assert_eq!(value, "my file.cpp"),
            other => panic!("expected whitespace rejection, got {:?}", other),
        }
    }

    #[test]
    fn test_instantiate_filename() {
        let ctx = TemplateContext::for_source("a.cpp").unwrap();
        let tpl = CommandTemplate::parse("g++ -O2 -o a.out __filename__").unwrap();
        assert_eq!(
            tpl.instantiate(&ctx).unwrap(),
            vec!["g++", "-O2", "-o", "a.out", "a.cpp"]
        );
    }

    #[test]
    fn test_instantiate_exec_embedded_in_token() {
        let ctx = TemplateContext::for_source("solve.py").unwrap();
        let tpl = CommandTemplate::parse("python2 __exec__.pyc").unwrap();
        assert_eq!(
            tpl.instantiate(&ctx).unwrap(),
            vec!["python2", "solve.pyc"]
        );
    }

    #[test]
    fn test_class_before_compile_fails() {
        let ctx = TemplateContext::for_source("Main.java").unwrap();
        let tpl = CommandTemplate::parse("java __class__").unwrap();
        assert_eq!(
            tpl.instantiate(&ctx),
            Err(TemplateError::UnresolvedClassName)
        );
    }

    #[test]
    fn test_class_after_compile() {
        let mut ctx = TemplateContext::for_source("Main.java").unwrap();
        ctx.set_class_name("Main").unwrap();
        let tpl = CommandTemplate::parse("java -ea __class__").unwrap();
        assert_eq!(tpl.instantiate(&ctx).unwrap(), vec!["java", "-ea", "Main"]);
    }

    #[test]
    fn test_extra_args_appended_verbatim() {
        let ctx = TemplateContext::for_source("judge.sh").unwrap();
        let tpl = CommandTemplate::parse("sh __filename__").unwrap();
        let extra = vec!["/tmp/in.txt".to_string(), "/tmp/out.txt".to_string()];
        assert_eq!(
            tpl.instantiate_with_args(&ctx, &extra).unwrap(),
            vec!["sh", "judge.sh", "/tmp/in.txt", "/tmp/out.txt"]
        );
    }

    #[test]
    fn test_empty_template_rejected() {
        assert_eq!(
            CommandTemplate::parse("   "),
            Err(TemplateError::EmptyTemplate)
        );
    }
}
