//! Per-language Tree-sitter capture queries.
//!
//! Every query speaks the same capture vocabulary, which is what lets the
//! analyzer stay language-agnostic:
//!
//! - `<kind>.definition` — anchors a declaration; `<kind>` maps to a
//!   [`crate::graph::NodeKind`] via `from_capture_prefix`.
//! - `import.source` — the node holding a module path (string literal for
//!   most languages, dotted/scoped names for Python and Rust).
//! - `inheritance` / `implementation` / `call` / `reference` — the
//!   identifier being referenced.
//! - `qualifier.async` / `qualifier.static` / `qualifier.visibility` /
//!   `qualifier.throws` — modifier tokens inside a definition's subtree.
//! - `symbol.parameters` / `symbol.returnType` — typed sub-nodes used for
//!   signature extraction.
//!
//! Captures are associated to definitions by byte-range containment, so the
//! queries never need to tie a qualifier to its declaration structurally.

/// TypeScript / TSX. The TSX grammar is a superset, so both rows share this
/// query. Definitions are captured both bare and export-wrapped; the
/// analyzer's first-wins id rule collapses the overlap and the wrapped
/// capture keeps the `export` prefix in snippets.
pub const TYPESCRIPT: &str = r#"
    (function_declaration) @function.definition
    (export_statement (function_declaration)) @function.definition
    (export_statement (arrow_function)) @arrow_function.definition
    (class_declaration) @class.definition
    (export_statement (class_declaration)) @class.definition
    (abstract_class_declaration) @class.definition
    (interface_declaration) @interface.definition
    (type_alias_declaration) @type.definition
    (enum_declaration) @enum.definition
    (internal_module) @namespace.definition

    (lexical_declaration
      (variable_declarator value: [(arrow_function) (function_expression)])) @arrow_function.definition
    (export_statement
      (lexical_declaration
        (variable_declarator value: [(arrow_function) (function_expression)]))) @arrow_function.definition
    (lexical_declaration) @variable.definition
    (export_statement (lexical_declaration)) @variable.definition
    (variable_declaration) @variable.definition

    (method_definition) @method.definition
    (public_field_definition) @field.definition

    (import_statement source: (string) @import.source)
    (export_statement source: (string) @import.source)

    (extends_clause value: (identifier) @inheritance)
    (extends_type_clause type: (type_identifier) @inheritance)
    (implements_clause (type_identifier) @implementation)

    (call_expression function: (identifier) @call)
    (call_expression function: (member_expression property: (property_identifier) @call))
    (new_expression constructor: (identifier) @call)

    "async" @qualifier.async
    "static" @qualifier.static
    (accessibility_modifier) @qualifier.visibility

    (formal_parameters) @symbol.parameters
    (function_declaration return_type: (type_annotation) @symbol.returnType)
    (method_definition return_type: (type_annotation) @symbol.returnType)
    (arrow_function return_type: (type_annotation) @symbol.returnType)
"#;

/// Plain JavaScript: the TypeScript query minus TS-only node types.
pub const JAVASCRIPT: &str = r#"
    (function_declaration) @function.definition
    (export_statement (function_declaration)) @function.definition
    (export_statement (arrow_function)) @arrow_function.definition
    (class_declaration) @class.definition
    (export_statement (class_declaration)) @class.definition

    (lexical_declaration
      (variable_declarator value: [(arrow_function) (function_expression)])) @arrow_function.definition
    (export_statement
      (lexical_declaration
        (variable_declarator value: [(arrow_function) (function_expression)]))) @arrow_function.definition
    (lexical_declaration) @variable.definition
    (export_statement (lexical_declaration)) @variable.definition
    (variable_declaration) @variable.definition

    (method_definition) @method.definition
    (field_definition) @field.definition

    (import_statement source: (string) @import.source)
    (export_statement source: (string) @import.source)

    (class_heritage (identifier) @inheritance)

    (call_expression function: (identifier) @call)
    (call_expression function: (member_expression property: (property_identifier) @call))
    (new_expression constructor: (identifier) @call)

    "async" @qualifier.async
    "static" @qualifier.static

    (formal_parameters) @symbol.parameters
"#;

pub const PYTHON: &str = r#"
    (function_definition) @function.definition
    (decorated_definition (function_definition)) @function.definition
    (class_definition) @class.definition
    (decorated_definition (class_definition)) @class.definition
    (expression_statement (assignment)) @variable.definition

    (import_from_statement module_name: (dotted_name) @import.source)
    (import_from_statement module_name: (relative_import) @import.source)
    (import_statement name: (dotted_name) @import.source)
    (import_statement name: (aliased_import name: (dotted_name) @import.source))

    (class_definition superclasses: (argument_list (identifier) @inheritance))

    (call function: (identifier) @call)
    (call function: (attribute attribute: (identifier) @call))

    "async" @qualifier.async

    (function_definition parameters: (parameters) @symbol.parameters)
    (function_definition return_type: (type) @symbol.returnType)
"#;

pub const GO: &str = r#"
    (function_declaration) @function.definition
    (method_declaration) @method.definition
    (type_declaration (type_spec type: (struct_type))) @struct.definition
    (type_declaration (type_spec type: (interface_type))) @interface.definition
    (type_declaration (type_spec type: (type_identifier))) @type.definition
    (const_declaration) @constant.definition
    (source_file (var_declaration) @variable.definition)

    (import_spec path: (interpreted_string_literal) @import.source)

    (call_expression function: (identifier) @call)
    (call_expression function: (selector_expression field: (field_identifier) @call))

    (function_declaration parameters: (parameter_list) @symbol.parameters)
    (method_declaration parameters: (parameter_list) @symbol.parameters)
"#;

pub const RUST: &str = r#"
    (function_item) @function.definition
    (struct_item) @struct.definition
    (enum_item) @enum.definition
    (union_item) @union.definition
    (trait_item) @trait.definition
    (type_item) @type.definition
    (const_item) @constant.definition
    (static_item) @static.definition

    (impl_item) @impl.definition

    (mod_item name: (identifier) @import.source)
    (use_declaration argument: (_) @import.source)

    (impl_item trait: (type_identifier) @implementation)

    (call_expression function: (identifier) @call)
    (call_expression function: (scoped_identifier name: (identifier) @call))
    (call_expression function: (field_expression field: (field_identifier) @call))
    (macro_invocation macro: (identifier) @reference)

    "async" @qualifier.async
    (visibility_modifier) @qualifier.visibility

    (function_item parameters: (parameters) @symbol.parameters)
    (function_item return_type: (_) @symbol.returnType)
"#;

pub const JAVA: &str = r#"
    (class_declaration) @class.definition
    (interface_declaration) @interface.definition
    (enum_declaration) @enum.definition
    (method_declaration) @method.definition
    (constructor_declaration) @constructor.definition
    (field_declaration) @field.definition

    (import_declaration (scoped_identifier) @import.source)

    (superclass (type_identifier) @inheritance)
    (super_interfaces (type_list (type_identifier) @implementation))

    (method_invocation name: (identifier) @call)
    (object_creation_expression type: (type_identifier) @call)

    ["public" "private" "protected"] @qualifier.visibility
    "static" @qualifier.static
    (throws) @qualifier.throws

    (formal_parameters) @symbol.parameters
    (method_declaration type: (_) @symbol.returnType)
"#;

pub const C_SHARP: &str = r#"
    (class_declaration) @class.definition
    (interface_declaration) @interface.definition
    (struct_declaration) @struct.definition
    (enum_declaration) @enum.definition
    (method_declaration) @method.definition
    (constructor_declaration) @constructor.definition
    (field_declaration) @field.definition
    (property_declaration) @property.definition

    (using_directive (qualified_name) @import.source)
    (using_directive (identifier) @import.source)

    (base_list (identifier) @inheritance)

    (invocation_expression function: (identifier) @call)
    (invocation_expression
      function: (member_access_expression name: (identifier) @call))

    ["public" "private" "protected"] @qualifier.visibility
    "static" @qualifier.static
    "async" @qualifier.async

    (parameter_list) @symbol.parameters
"#;

pub const C: &str = r#"
    (function_definition) @function.definition
    (struct_specifier name: (type_identifier) body: (field_declaration_list)) @struct.definition
    (union_specifier name: (type_identifier) body: (field_declaration_list)) @union.definition
    (enum_specifier name: (type_identifier) body: (enumerator_list)) @enum.definition
    (type_definition) @type.definition

    (preproc_include path: (string_literal) @import.source)
    (preproc_include path: (system_lib_string) @import.source)

    (call_expression function: (identifier) @call)

    (function_definition declarator: (function_declarator parameters: (parameter_list) @symbol.parameters))
"#;

pub const CPP: &str = r#"
    (function_definition) @function.definition
    (class_specifier name: (type_identifier) body: (field_declaration_list)) @class.definition
    (struct_specifier name: (type_identifier) body: (field_declaration_list)) @struct.definition
    (union_specifier name: (type_identifier) body: (field_declaration_list)) @union.definition
    (enum_specifier name: (type_identifier) body: (enumerator_list)) @enum.definition
    (type_definition) @type.definition
    (namespace_definition) @namespace.definition
    (template_declaration) @template.definition

    (preproc_include path: (string_literal) @import.source)
    (preproc_include path: (system_lib_string) @import.source)

    (base_class_clause (type_identifier) @inheritance)

    (call_expression function: (identifier) @call)
    (call_expression function: (field_expression field: (field_identifier) @call))

    ["public" "private" "protected"] @qualifier.visibility
    "static" @qualifier.static
"#;

pub const PHP: &str = r#"
    (class_declaration) @class.definition
    (interface_declaration) @interface.definition
    (trait_declaration) @trait.definition
    (enum_declaration) @enum.definition
    (function_definition) @function.definition
    (method_declaration) @method.definition
    (namespace_definition) @namespace.definition

    (namespace_use_clause (qualified_name) @import.source)

    (base_clause (name) @inheritance)
    (class_interface_clause (name) @implementation)

    (function_call_expression function: (name) @call)
    (member_call_expression name: (name) @call)
    (object_creation_expression (name) @call)

    (visibility_modifier) @qualifier.visibility
    "static" @qualifier.static

    (formal_parameters) @symbol.parameters
"#;

pub const CSS: &str = r#"
    (rule_set) @css_rule.definition
"#;

/// Every element is captured; the HTML handler skips elements that carry
/// neither an `id` nor a `class` attribute, which keeps structural noise
/// (plain `<div>` soup) out of the graph. Attribute references feed the
/// CSS-selector resolution step.
pub const HTML: &str = r#"
    (element) @html_element.definition
    (attribute) @reference
"#;
