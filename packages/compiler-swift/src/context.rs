use chaingen_parser::GeneratorConfig;
use std::cell::RefCell;
use std::rc::Rc;

/// Options for Swift generation
#[derive(Debug, Clone)]
pub struct CompileOptions<'cfg> {
    pub config: &'cfg GeneratorConfig,
    /// Notice written in the file banner
    pub banner: String,
}

impl<'cfg> CompileOptions<'cfg> {
    pub fn new(config: &'cfg GeneratorConfig) -> Self {
        Self {
            config,
            banner: "Generated by chaingen. DO NOT EDIT.".to_string(),
        }
    }
}

/// Compilation context for managing state during code generation
pub struct CompilerContext<'cfg> {
    buffer: Rc<RefCell<String>>,
    indent_level: Rc<RefCell<usize>>,
    pub options: CompileOptions<'cfg>,
}

impl<'cfg> CompilerContext<'cfg> {
    pub fn new(options: CompileOptions<'cfg>) -> Self {
        Self {
            buffer: Rc::new(RefCell::new(String::new())),
            indent_level: Rc::new(RefCell::new(0)),
            options,
        }
    }

    pub fn config(&self) -> &'cfg GeneratorConfig {
        self.options.config
    }

    pub fn add(&self, text: &str) {
        self.buffer.borrow_mut().push_str(text);
    }

    pub fn add_line(&self, text: &str) {
        self.add_indented(text);
        self.add("\n");
    }

    /// Optional attribute line, e.g. an availability guard
    pub fn add_optional_line(&self, text: Option<&str>) {
        if let Some(text) = text {
            self.add_line(text);
        }
    }

    pub fn add_indented(&self, text: &str) {
        let indent = "    ".repeat(*self.indent_level.borrow());
        self.buffer.borrow_mut().push_str(&indent);
        self.buffer.borrow_mut().push_str(text);
    }

    pub fn indent(&self) {
        *self.indent_level.borrow_mut() += 1;
    }

    pub fn dedent(&self) {
        let mut level = self.indent_level.borrow_mut();
        if *level > 0 {
            *level -= 1;
        }
    }

    /// Drop one trailing newline if the buffer ends with a blank line
    pub fn trim_blank_line(&self) {
        let mut buffer = self.buffer.borrow_mut();
        if buffer.ends_with("\n\n") {
            buffer.pop();
        }
    }

    pub fn get_output(&self) -> String {
        self.buffer.borrow().clone()
    }

    pub fn with_new_buffer(&self) -> Self {
        Self {
            buffer: Rc::new(RefCell::new(String::new())),
            indent_level: self.indent_level.clone(),
            options: self.options.clone(),
        }
    }

    pub fn merge_buffer(&self, other: &CompilerContext<'_>) {
        self.buffer.borrow_mut().push_str(&other.buffer.borrow());
    }
}
