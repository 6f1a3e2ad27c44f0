//! Traversal of decoded class files
//!
//! A [`Visitor`] has one method per kind of node, each of which defaults to walking the children
//! of that node (through the matching `walk_*` function) and doing nothing else. Implementations
//! override the methods for the nodes they care about, and call the `walk_*` function from their
//! override when they still want the children visited.
//!
//! The default traversal order is:
//!
//!   - class file: fields, then methods, then class attributes
//!   - field, method, and record component: their attributes
//!   - code: instructions, then exception handlers, then attributes
//!   - stack map frame: locals, then stack items
//!
//! The constant pool is not part of the class file traversal: visit it explicitly with
//! [`Visitor::visit_constant_pool`]. Nodes are visited along with the class file that owns them,
//! since that is where their constant pool indices resolve.

use crate::jvm::bytecode::Instruction;
use crate::jvm::class_file::{
    Annotation, Attribute, AttributeInfo, BootstrapMethod, ClassConstantIndex, ClassFile, Code,
    Constant, ConstantIndex, ConstantPool, DynamicConstant, ElementValue, ElementValuePair,
    EnclosingMethod, ExceptionHandler, FeatureRef, Field, InnerClass, LineNumber, LocalVariable,
    Method, MethodHandle, MethodParameter, Module, NameAndType, PackageConstantIndex,
    PackageDirective, ParameterAnnotation, Provides, RecordComponent, Requires, TypeAnnotation,
    Utf8ConstantIndex,
};
use crate::jvm::verifier::{StackMapFrame, VerificationType};
use crate::util::Width;

#[allow(unused_variables)]
pub trait Visitor<'a> {
    fn visit_classfile(&mut self, classfile: &'a ClassFile) {
        walk_classfile(self, classfile)
    }

    fn visit_constant_pool(&mut self, classfile: &'a ClassFile, pool: &'a ConstantPool) {
        walk_constant_pool(self, classfile, pool)
    }

    // Constant pool entries

    fn visit_utf8_constant(
        &mut self,
        classfile: &'a ClassFile,
        index: ConstantIndex,
        value: &'a str,
    ) {
    }

    fn visit_integer_constant(
        &mut self,
        classfile: &'a ClassFile,
        index: ConstantIndex,
        value: i32,
    ) {
    }

    fn visit_float_constant(
        &mut self,
        classfile: &'a ClassFile,
        index: ConstantIndex,
        value: f32,
    ) {
    }

    fn visit_long_constant(&mut self, classfile: &'a ClassFile, index: ConstantIndex, value: i64) {}

    fn visit_double_constant(
        &mut self,
        classfile: &'a ClassFile,
        index: ConstantIndex,
        value: f64,
    ) {
    }

    fn visit_class_constant(
        &mut self,
        classfile: &'a ClassFile,
        index: ConstantIndex,
        name: Utf8ConstantIndex,
    ) {
    }

    fn visit_string_constant(
        &mut self,
        classfile: &'a ClassFile,
        index: ConstantIndex,
        value: Utf8ConstantIndex,
    ) {
    }

    fn visit_field_ref_constant(
        &mut self,
        classfile: &'a ClassFile,
        index: ConstantIndex,
        field: &'a FeatureRef,
    ) {
    }

    fn visit_method_ref_constant(
        &mut self,
        classfile: &'a ClassFile,
        index: ConstantIndex,
        method: &'a FeatureRef,
    ) {
    }

    fn visit_interface_method_ref_constant(
        &mut self,
        classfile: &'a ClassFile,
        index: ConstantIndex,
        method: &'a FeatureRef,
    ) {
    }

    fn visit_name_and_type_constant(
        &mut self,
        classfile: &'a ClassFile,
        index: ConstantIndex,
        name_and_type: &'a NameAndType,
    ) {
    }

    fn visit_method_handle_constant(
        &mut self,
        classfile: &'a ClassFile,
        index: ConstantIndex,
        handle: &'a MethodHandle,
    ) {
    }

    fn visit_method_type_constant(
        &mut self,
        classfile: &'a ClassFile,
        index: ConstantIndex,
        descriptor: Utf8ConstantIndex,
    ) {
    }

    fn visit_dynamic_constant(
        &mut self,
        classfile: &'a ClassFile,
        index: ConstantIndex,
        dynamic: &'a DynamicConstant,
    ) {
    }

    fn visit_invoke_dynamic_constant(
        &mut self,
        classfile: &'a ClassFile,
        index: ConstantIndex,
        dynamic: &'a DynamicConstant,
    ) {
    }

    fn visit_module_constant(
        &mut self,
        classfile: &'a ClassFile,
        index: ConstantIndex,
        name: Utf8ConstantIndex,
    ) {
    }

    fn visit_package_constant(
        &mut self,
        classfile: &'a ClassFile,
        index: ConstantIndex,
        name: Utf8ConstantIndex,
    ) {
    }

    /// Slot following a `long` or `double` constant
    fn visit_unusable_constant(&mut self, classfile: &'a ClassFile, index: ConstantIndex) {}

    // Features

    fn visit_field(&mut self, classfile: &'a ClassFile, field: &'a Field) {
        walk_field(self, classfile, field)
    }

    fn visit_method(&mut self, classfile: &'a ClassFile, method: &'a Method) {
        walk_method(self, classfile, method)
    }

    // Attributes

    /// Called for every attribute before dispatching on its type
    fn visit_attribute(&mut self, classfile: &'a ClassFile, attribute: &'a Attribute) {
        walk_attribute(self, classfile, attribute)
    }

    fn visit_constant_value_attribute(&mut self, classfile: &'a ClassFile, value: ConstantIndex) {}

    fn visit_code_attribute(&mut self, classfile: &'a ClassFile, code: &'a Code) {
        walk_code(self, classfile, code)
    }

    fn visit_stack_map_table_attribute(
        &mut self,
        classfile: &'a ClassFile,
        frames: &'a [StackMapFrame],
    ) {
        for frame in frames {
            walk_stack_map_frame(self, classfile, frame);
        }
    }

    fn visit_exceptions_attribute(
        &mut self,
        classfile: &'a ClassFile,
        exceptions: &'a [ClassConstantIndex],
    ) {
        walk_class_constants(self, classfile, exceptions)
    }

    fn visit_inner_classes_attribute(
        &mut self,
        classfile: &'a ClassFile,
        inner_classes: &'a [InnerClass],
    ) {
        for inner_class in inner_classes {
            self.visit_inner_class(classfile, inner_class);
        }
    }

    fn visit_enclosing_method_attribute(
        &mut self,
        classfile: &'a ClassFile,
        enclosing_method: &'a EnclosingMethod,
    ) {
    }

    fn visit_synthetic_attribute(&mut self, classfile: &'a ClassFile) {}

    fn visit_signature_attribute(
        &mut self,
        classfile: &'a ClassFile,
        signature: Utf8ConstantIndex,
    ) {
    }

    fn visit_source_file_attribute(&mut self, classfile: &'a ClassFile, name: Utf8ConstantIndex) {}

    fn visit_source_debug_extension_attribute(
        &mut self,
        classfile: &'a ClassFile,
        debug: &'a [u8],
    ) {
    }

    fn visit_line_number_table_attribute(
        &mut self,
        classfile: &'a ClassFile,
        line_numbers: &'a [LineNumber],
    ) {
        for line_number in line_numbers {
            self.visit_line_number(classfile, line_number);
        }
    }

    fn visit_local_variable_table_attribute(
        &mut self,
        classfile: &'a ClassFile,
        variables: &'a [LocalVariable],
    ) {
        for variable in variables {
            self.visit_local_variable(classfile, variable);
        }
    }

    fn visit_local_variable_type_table_attribute(
        &mut self,
        classfile: &'a ClassFile,
        variables: &'a [LocalVariable],
    ) {
        for variable in variables {
            self.visit_local_variable_type(classfile, variable);
        }
    }

    fn visit_deprecated_attribute(&mut self, classfile: &'a ClassFile) {}

    fn visit_runtime_visible_annotations_attribute(
        &mut self,
        classfile: &'a ClassFile,
        annotations: &'a [Annotation],
    ) {
        for annotation in annotations {
            self.visit_annotation(classfile, annotation);
        }
    }

    fn visit_runtime_invisible_annotations_attribute(
        &mut self,
        classfile: &'a ClassFile,
        annotations: &'a [Annotation],
    ) {
        for annotation in annotations {
            self.visit_annotation(classfile, annotation);
        }
    }

    fn visit_runtime_visible_parameter_annotations_attribute(
        &mut self,
        classfile: &'a ClassFile,
        parameters: &'a [ParameterAnnotation],
    ) {
        for parameter in parameters {
            self.visit_parameter_annotation(classfile, parameter);
        }
    }

    fn visit_runtime_invisible_parameter_annotations_attribute(
        &mut self,
        classfile: &'a ClassFile,
        parameters: &'a [ParameterAnnotation],
    ) {
        for parameter in parameters {
            self.visit_parameter_annotation(classfile, parameter);
        }
    }

    fn visit_runtime_visible_type_annotations_attribute(
        &mut self,
        classfile: &'a ClassFile,
        annotations: &'a [TypeAnnotation],
    ) {
        for annotation in annotations {
            self.visit_type_annotation(classfile, annotation);
        }
    }

    fn visit_runtime_invisible_type_annotations_attribute(
        &mut self,
        classfile: &'a ClassFile,
        annotations: &'a [TypeAnnotation],
    ) {
        for annotation in annotations {
            self.visit_type_annotation(classfile, annotation);
        }
    }

    fn visit_annotation_default_attribute(
        &mut self,
        classfile: &'a ClassFile,
        value: &'a ElementValue,
    ) {
        self.visit_element_value(classfile, value)
    }

    fn visit_bootstrap_methods_attribute(
        &mut self,
        classfile: &'a ClassFile,
        bootstrap_methods: &'a [BootstrapMethod],
    ) {
        for bootstrap_method in bootstrap_methods {
            self.visit_bootstrap_method(classfile, bootstrap_method);
        }
    }

    fn visit_method_parameters_attribute(
        &mut self,
        classfile: &'a ClassFile,
        parameters: &'a [MethodParameter],
    ) {
        for parameter in parameters {
            self.visit_method_parameter(classfile, parameter);
        }
    }

    fn visit_module_attribute(&mut self, classfile: &'a ClassFile, module: &'a Module) {
        walk_module(self, classfile, module)
    }

    fn visit_module_packages_attribute(
        &mut self,
        classfile: &'a ClassFile,
        packages: &'a [PackageConstantIndex],
    ) {
    }

    fn visit_module_main_class_attribute(
        &mut self,
        classfile: &'a ClassFile,
        main_class: ClassConstantIndex,
    ) {
    }

    fn visit_nest_host_attribute(&mut self, classfile: &'a ClassFile, host: ClassConstantIndex) {}

    fn visit_nest_members_attribute(
        &mut self,
        classfile: &'a ClassFile,
        members: &'a [ClassConstantIndex],
    ) {
        walk_class_constants(self, classfile, members)
    }

    fn visit_record_attribute(
        &mut self,
        classfile: &'a ClassFile,
        components: &'a [RecordComponent],
    ) {
        for component in components {
            self.visit_record_component(classfile, component);
        }
    }

    fn visit_permitted_subclasses_attribute(
        &mut self,
        classfile: &'a ClassFile,
        subclasses: &'a [ClassConstantIndex],
    ) {
        walk_class_constants(self, classfile, subclasses)
    }

    /// Attribute with an unrecognized name
    fn visit_custom_attribute(
        &mut self,
        classfile: &'a ClassFile,
        attribute: &'a Attribute,
        bytes: &'a [u8],
    ) {
    }

    // Parts of attributes

    fn visit_instruction(&mut self, classfile: &'a ClassFile, instruction: Instruction<'a>) {}

    fn visit_exception_handler(
        &mut self,
        classfile: &'a ClassFile,
        handler: &'a ExceptionHandler,
    ) {
    }

    fn visit_inner_class(&mut self, classfile: &'a ClassFile, inner_class: &'a InnerClass) {}

    fn visit_line_number(&mut self, classfile: &'a ClassFile, line_number: &'a LineNumber) {}

    fn visit_local_variable(&mut self, classfile: &'a ClassFile, variable: &'a LocalVariable) {}

    fn visit_local_variable_type(
        &mut self,
        classfile: &'a ClassFile,
        variable: &'a LocalVariable,
    ) {
    }

    fn visit_bootstrap_method(
        &mut self,
        classfile: &'a ClassFile,
        bootstrap_method: &'a BootstrapMethod,
    ) {
    }

    fn visit_method_parameter(
        &mut self,
        classfile: &'a ClassFile,
        parameter: &'a MethodParameter,
    ) {
    }

    fn visit_record_component(&mut self, classfile: &'a ClassFile, component: &'a RecordComponent) {
        walk_attributes(self, classfile, &component.attributes)
    }

    // Module directives

    fn visit_module_requires(&mut self, classfile: &'a ClassFile, requires: &'a Requires) {}

    fn visit_module_exports(&mut self, classfile: &'a ClassFile, exports: &'a PackageDirective) {}

    fn visit_module_opens(&mut self, classfile: &'a ClassFile, opens: &'a PackageDirective) {}

    fn visit_module_uses(&mut self, classfile: &'a ClassFile, service: ClassConstantIndex) {}

    fn visit_module_provides(&mut self, classfile: &'a ClassFile, provides: &'a Provides) {}

    // Stack map frames

    fn visit_same_frame(&mut self, classfile: &'a ClassFile, frame: &'a StackMapFrame) {}

    fn visit_same_locals_1_stack_item_frame(
        &mut self,
        classfile: &'a ClassFile,
        frame: &'a StackMapFrame,
    ) {
        walk_frame_types(self, classfile, frame)
    }

    fn visit_same_locals_1_stack_item_frame_extended(
        &mut self,
        classfile: &'a ClassFile,
        frame: &'a StackMapFrame,
    ) {
        walk_frame_types(self, classfile, frame)
    }

    fn visit_chop_frame(&mut self, classfile: &'a ClassFile, frame: &'a StackMapFrame) {}

    fn visit_same_frame_extended(&mut self, classfile: &'a ClassFile, frame: &'a StackMapFrame) {}

    fn visit_append_frame(&mut self, classfile: &'a ClassFile, frame: &'a StackMapFrame) {
        walk_frame_types(self, classfile, frame)
    }

    fn visit_full_frame(&mut self, classfile: &'a ClassFile, frame: &'a StackMapFrame) {
        walk_frame_types(self, classfile, frame)
    }

    fn visit_verification_type(&mut self, classfile: &'a ClassFile, typ: &'a VerificationType) {}

    // Annotations

    fn visit_annotation(&mut self, classfile: &'a ClassFile, annotation: &'a Annotation) {
        for pair in &annotation.element_value_pairs {
            self.visit_element_value_pair(classfile, pair);
        }
    }

    fn visit_parameter_annotation(
        &mut self,
        classfile: &'a ClassFile,
        parameter: &'a ParameterAnnotation,
    ) {
        for annotation in &parameter.annotations {
            self.visit_annotation(classfile, annotation);
        }
    }

    fn visit_type_annotation(&mut self, classfile: &'a ClassFile, annotation: &'a TypeAnnotation) {
        for pair in &annotation.element_value_pairs {
            self.visit_element_value_pair(classfile, pair);
        }
    }

    fn visit_element_value_pair(&mut self, classfile: &'a ClassFile, pair: &'a ElementValuePair) {
        self.visit_element_value(classfile, &pair.value)
    }

    /// Called for every element value before dispatching on its kind
    fn visit_element_value(&mut self, classfile: &'a ClassFile, value: &'a ElementValue) {
        walk_element_value(self, classfile, value)
    }

    /// Primitive or string constant (see [`ElementValue::tag`] for which)
    fn visit_constant_element_value(
        &mut self,
        classfile: &'a ClassFile,
        tag: char,
        value: ConstantIndex,
    ) {
    }

    fn visit_enum_element_value(
        &mut self,
        classfile: &'a ClassFile,
        type_name: Utf8ConstantIndex,
        const_name: Utf8ConstantIndex,
    ) {
    }

    fn visit_class_element_value(
        &mut self,
        classfile: &'a ClassFile,
        descriptor: Utf8ConstantIndex,
    ) {
    }

    fn visit_annotation_element_value(
        &mut self,
        classfile: &'a ClassFile,
        annotation: &'a Annotation,
    ) {
        self.visit_annotation(classfile, annotation)
    }

    fn visit_array_element_value(&mut self, classfile: &'a ClassFile, values: &'a [ElementValue]) {
        for value in values {
            self.visit_element_value(classfile, value);
        }
    }
}

/// Visit several class files in turn
pub fn visit_classfiles<'a, V, I>(visitor: &mut V, classfiles: I)
where
    V: Visitor<'a> + ?Sized,
    I: IntoIterator<Item = &'a ClassFile>,
{
    for classfile in classfiles {
        visitor.visit_classfile(classfile);
    }
}

pub fn walk_classfile<'a, V: Visitor<'a> + ?Sized>(visitor: &mut V, classfile: &'a ClassFile) {
    for field in &classfile.fields {
        visitor.visit_field(classfile, field);
    }
    for method in &classfile.methods {
        visitor.visit_method(classfile, method);
    }
    walk_attributes(visitor, classfile, &classfile.attributes);
}

/// Visit every slot of the pool in index order, including the unusable ones
pub fn walk_constant_pool<'a, V: Visitor<'a> + ?Sized>(
    visitor: &mut V,
    classfile: &'a ClassFile,
    pool: &'a ConstantPool,
) {
    for (index, constant) in pool.iter() {
        walk_constant(visitor, classfile, index, constant);
        for phantom in 1..constant.width() {
            visitor.visit_unusable_constant(classfile, ConstantIndex(index.0 + phantom as u16));
        }
    }
}

/// Dispatch a constant to the method for its kind
pub fn walk_constant<'a, V: Visitor<'a> + ?Sized>(
    visitor: &mut V,
    classfile: &'a ClassFile,
    index: ConstantIndex,
    constant: &'a Constant,
) {
    match constant {
        Constant::Utf8(value) => visitor.visit_utf8_constant(classfile, index, value),
        Constant::Integer(value) => visitor.visit_integer_constant(classfile, index, *value),
        Constant::Float(value) => visitor.visit_float_constant(classfile, index, *value),
        Constant::Long(value) => visitor.visit_long_constant(classfile, index, *value),
        Constant::Double(value) => visitor.visit_double_constant(classfile, index, *value),
        Constant::Class(name) => visitor.visit_class_constant(classfile, index, *name),
        Constant::String(value) => visitor.visit_string_constant(classfile, index, *value),
        Constant::FieldRef(field) => visitor.visit_field_ref_constant(classfile, index, field),
        Constant::MethodRef(method) => visitor.visit_method_ref_constant(classfile, index, method),
        Constant::InterfaceMethodRef(method) => {
            visitor.visit_interface_method_ref_constant(classfile, index, method)
        }
        Constant::NameAndType(name_and_type) => {
            visitor.visit_name_and_type_constant(classfile, index, name_and_type)
        }
        Constant::MethodHandle(handle) => {
            visitor.visit_method_handle_constant(classfile, index, handle)
        }
        Constant::MethodType(descriptor) => {
            visitor.visit_method_type_constant(classfile, index, *descriptor)
        }
        Constant::Dynamic(dynamic) => visitor.visit_dynamic_constant(classfile, index, dynamic),
        Constant::InvokeDynamic(dynamic) => {
            visitor.visit_invoke_dynamic_constant(classfile, index, dynamic)
        }
        Constant::Module(name) => visitor.visit_module_constant(classfile, index, *name),
        Constant::Package(name) => visitor.visit_package_constant(classfile, index, *name),
    }
}

/// Visit the class constants behind a list of indices (skipping indices that don't resolve)
pub fn walk_class_constants<'a, V: Visitor<'a> + ?Sized>(
    visitor: &mut V,
    classfile: &'a ClassFile,
    classes: &'a [ClassConstantIndex],
) {
    for class in classes {
        match classfile.constants.get(*class) {
            Ok(constant) => walk_constant(visitor, classfile, class.0, constant),
            Err(err) => log::debug!("Skipping class reference {}: {}", class.0, err),
        }
    }
}

pub fn walk_field<'a, V: Visitor<'a> + ?Sized>(
    visitor: &mut V,
    classfile: &'a ClassFile,
    field: &'a Field,
) {
    walk_attributes(visitor, classfile, &field.attributes)
}

pub fn walk_method<'a, V: Visitor<'a> + ?Sized>(
    visitor: &mut V,
    classfile: &'a ClassFile,
    method: &'a Method,
) {
    walk_attributes(visitor, classfile, &method.attributes)
}

pub fn walk_attributes<'a, V: Visitor<'a> + ?Sized>(
    visitor: &mut V,
    classfile: &'a ClassFile,
    attributes: &'a [Attribute],
) {
    for attribute in attributes {
        visitor.visit_attribute(classfile, attribute);
    }
}

/// Dispatch an attribute to the method for its type
pub fn walk_attribute<'a, V: Visitor<'a> + ?Sized>(
    visitor: &mut V,
    classfile: &'a ClassFile,
    attribute: &'a Attribute,
) {
    match &attribute.info {
        AttributeInfo::ConstantValue(value) => {
            visitor.visit_constant_value_attribute(classfile, *value)
        }
        AttributeInfo::Code(code) => visitor.visit_code_attribute(classfile, code),
        AttributeInfo::StackMapTable(frames) => {
            visitor.visit_stack_map_table_attribute(classfile, frames)
        }
        AttributeInfo::Exceptions(exceptions) => {
            visitor.visit_exceptions_attribute(classfile, exceptions)
        }
        AttributeInfo::InnerClasses(inner_classes) => {
            visitor.visit_inner_classes_attribute(classfile, inner_classes)
        }
        AttributeInfo::EnclosingMethod(enclosing_method) => {
            visitor.visit_enclosing_method_attribute(classfile, enclosing_method)
        }
        AttributeInfo::Synthetic => visitor.visit_synthetic_attribute(classfile),
        AttributeInfo::Signature(signature) => {
            visitor.visit_signature_attribute(classfile, *signature)
        }
        AttributeInfo::SourceFile(name) => visitor.visit_source_file_attribute(classfile, *name),
        AttributeInfo::SourceDebugExtension(debug) => {
            visitor.visit_source_debug_extension_attribute(classfile, debug)
        }
        AttributeInfo::LineNumberTable(line_numbers) => {
            visitor.visit_line_number_table_attribute(classfile, line_numbers)
        }
        AttributeInfo::LocalVariableTable(variables) => {
            visitor.visit_local_variable_table_attribute(classfile, variables)
        }
        AttributeInfo::LocalVariableTypeTable(variables) => {
            visitor.visit_local_variable_type_table_attribute(classfile, variables)
        }
        AttributeInfo::Deprecated => visitor.visit_deprecated_attribute(classfile),
        AttributeInfo::RuntimeVisibleAnnotations(annotations) => {
            visitor.visit_runtime_visible_annotations_attribute(classfile, annotations)
        }
        AttributeInfo::RuntimeInvisibleAnnotations(annotations) => {
            visitor.visit_runtime_invisible_annotations_attribute(classfile, annotations)
        }
        AttributeInfo::RuntimeVisibleParameterAnnotations(parameters) => {
            visitor.visit_runtime_visible_parameter_annotations_attribute(classfile, parameters)
        }
        AttributeInfo::RuntimeInvisibleParameterAnnotations(parameters) => {
            visitor.visit_runtime_invisible_parameter_annotations_attribute(classfile, parameters)
        }
        AttributeInfo::RuntimeVisibleTypeAnnotations(annotations) => {
            visitor.visit_runtime_visible_type_annotations_attribute(classfile, annotations)
        }
        AttributeInfo::RuntimeInvisibleTypeAnnotations(annotations) => {
            visitor.visit_runtime_invisible_type_annotations_attribute(classfile, annotations)
        }
        AttributeInfo::AnnotationDefault(value) => {
            visitor.visit_annotation_default_attribute(classfile, value)
        }
        AttributeInfo::BootstrapMethods(bootstrap_methods) => {
            visitor.visit_bootstrap_methods_attribute(classfile, bootstrap_methods)
        }
        AttributeInfo::MethodParameters(parameters) => {
            visitor.visit_method_parameters_attribute(classfile, parameters)
        }
        AttributeInfo::Module(module) => visitor.visit_module_attribute(classfile, module),
        AttributeInfo::ModulePackages(packages) => {
            visitor.visit_module_packages_attribute(classfile, packages)
        }
        AttributeInfo::ModuleMainClass(main_class) => {
            visitor.visit_module_main_class_attribute(classfile, *main_class)
        }
        AttributeInfo::NestHost(host) => visitor.visit_nest_host_attribute(classfile, *host),
        AttributeInfo::NestMembers(members) => {
            visitor.visit_nest_members_attribute(classfile, members)
        }
        AttributeInfo::Record(components) => visitor.visit_record_attribute(classfile, components),
        AttributeInfo::PermittedSubclasses(subclasses) => {
            visitor.visit_permitted_subclasses_attribute(classfile, subclasses)
        }
        AttributeInfo::Custom(bytes) => visitor.visit_custom_attribute(classfile, attribute, bytes),
    }
}

pub fn walk_code<'a, V: Visitor<'a> + ?Sized>(
    visitor: &mut V,
    classfile: &'a ClassFile,
    code: &'a Code,
) {
    for instruction in code.instructions() {
        visitor.visit_instruction(classfile, instruction);
    }
    for handler in &code.exception_table {
        visitor.visit_exception_handler(classfile, handler);
    }
    walk_attributes(visitor, classfile, &code.attributes);
}

pub fn walk_module<'a, V: Visitor<'a> + ?Sized>(
    visitor: &mut V,
    classfile: &'a ClassFile,
    module: &'a Module,
) {
    for requires in &module.requires {
        visitor.visit_module_requires(classfile, requires);
    }
    for exports in &module.exports {
        visitor.visit_module_exports(classfile, exports);
    }
    for opens in &module.opens {
        visitor.visit_module_opens(classfile, opens);
    }
    for service in &module.uses {
        visitor.visit_module_uses(classfile, *service);
    }
    for provides in &module.provides {
        visitor.visit_module_provides(classfile, provides);
    }
}

/// Dispatch a frame to the method for its kind
pub fn walk_stack_map_frame<'a, V: Visitor<'a> + ?Sized>(
    visitor: &mut V,
    classfile: &'a ClassFile,
    frame: &'a StackMapFrame,
) {
    match frame {
        StackMapFrame::Same { .. } => visitor.visit_same_frame(classfile, frame),
        StackMapFrame::SameLocals1StackItem { .. } => {
            visitor.visit_same_locals_1_stack_item_frame(classfile, frame)
        }
        StackMapFrame::SameLocals1StackItemExtended { .. } => {
            visitor.visit_same_locals_1_stack_item_frame_extended(classfile, frame)
        }
        StackMapFrame::Chop { .. } => visitor.visit_chop_frame(classfile, frame),
        StackMapFrame::SameExtended { .. } => visitor.visit_same_frame_extended(classfile, frame),
        StackMapFrame::Append { .. } => visitor.visit_append_frame(classfile, frame),
        StackMapFrame::Full { .. } => visitor.visit_full_frame(classfile, frame),
    }
}

/// Visit the locals of a frame, then its stack items
pub fn walk_frame_types<'a, V: Visitor<'a> + ?Sized>(
    visitor: &mut V,
    classfile: &'a ClassFile,
    frame: &'a StackMapFrame,
) {
    for typ in frame.locals().iter().chain(frame.stack()) {
        visitor.visit_verification_type(classfile, typ);
    }
}

/// Dispatch an element value to the method for its kind
pub fn walk_element_value<'a, V: Visitor<'a> + ?Sized>(
    visitor: &mut V,
    classfile: &'a ClassFile,
    value: &'a ElementValue,
) {
    match value {
        ElementValue::Byte(index)
        | ElementValue::Char(index)
        | ElementValue::Double(index)
        | ElementValue::Float(index)
        | ElementValue::Int(index)
        | ElementValue::Long(index)
        | ElementValue::Short(index)
        | ElementValue::Boolean(index) => {
            visitor.visit_constant_element_value(classfile, value.tag(), *index)
        }
        ElementValue::String(index) => {
            visitor.visit_constant_element_value(classfile, value.tag(), index.0)
        }
        ElementValue::Enum {
            type_name,
            const_name,
        } => visitor.visit_enum_element_value(classfile, *type_name, *const_name),
        ElementValue::Class(descriptor) => {
            visitor.visit_class_element_value(classfile, *descriptor)
        }
        ElementValue::Annotation(annotation) => {
            visitor.visit_annotation_element_value(classfile, annotation)
        }
        ElementValue::Array(values) => visitor.visit_array_element_value(classfile, values),
    }
}

/// Nodes that can be handed to a visitor
///
/// Every node is visited along with the class file owning it. The class file itself is visited
/// with [`ClassFile::accept`].
pub trait Visitable<'a> {
    fn accept<V: Visitor<'a> + ?Sized>(&'a self, classfile: &'a ClassFile, visitor: &mut V);
}

impl ClassFile {
    pub fn accept<'a, V: Visitor<'a> + ?Sized>(&'a self, visitor: &mut V) {
        visitor.visit_classfile(self)
    }
}

macro_rules! visitable {
    ($($node:ty => $method:ident),* $(,)?) => {
        $(
            impl<'a> Visitable<'a> for $node {
                fn accept<V: Visitor<'a> + ?Sized>(
                    &'a self,
                    classfile: &'a ClassFile,
                    visitor: &mut V,
                ) {
                    visitor.$method(classfile, self)
                }
            }
        )*
    };
}

visitable!(
    ConstantPool => visit_constant_pool,
    Field => visit_field,
    Method => visit_method,
    Attribute => visit_attribute,
    Code => visit_code_attribute,
    ExceptionHandler => visit_exception_handler,
    InnerClass => visit_inner_class,
    LineNumber => visit_line_number,
    BootstrapMethod => visit_bootstrap_method,
    MethodParameter => visit_method_parameter,
    RecordComponent => visit_record_component,
    Annotation => visit_annotation,
    ParameterAnnotation => visit_parameter_annotation,
    TypeAnnotation => visit_type_annotation,
    ElementValuePair => visit_element_value_pair,
    ElementValue => visit_element_value,
    VerificationType => visit_verification_type,
);

impl<'a> Visitable<'a> for StackMapFrame {
    fn accept<V: Visitor<'a> + ?Sized>(&'a self, classfile: &'a ClassFile, visitor: &mut V) {
        walk_stack_map_frame(visitor, classfile, self)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::jvm::class_file::Version;
    use crate::jvm::ClassAccessFlags;

    /// Records the order in which nodes are visited
    #[derive(Default)]
    struct Trace(Vec<String>);

    impl<'a> Visitor<'a> for Trace {
        fn visit_utf8_constant(&mut self, _: &'a ClassFile, index: ConstantIndex, value: &'a str) {
            self.0.push(format!("utf8 {} {}", index, value));
        }

        fn visit_long_constant(&mut self, _: &'a ClassFile, index: ConstantIndex, value: i64) {
            self.0.push(format!("long {} {}", index, value));
        }

        fn visit_unusable_constant(&mut self, _: &'a ClassFile, index: ConstantIndex) {
            self.0.push(format!("unusable {}", index));
        }

        fn visit_class_constant(
            &mut self,
            _: &'a ClassFile,
            index: ConstantIndex,
            _: Utf8ConstantIndex,
        ) {
            self.0.push(format!("class {}", index));
        }

        fn visit_verification_type(&mut self, _: &'a ClassFile, typ: &'a VerificationType) {
            self.0.push(format!("type {}", typ.tag()));
        }
    }

    fn classfile(constants: Vec<Constant>) -> ClassFile {
        ClassFile {
            version: Version::JAVA8,
            constants: constants.into_iter().collect(),
            access_flags: ClassAccessFlags::PUBLIC,
            this_class: ClassConstantIndex(ConstantIndex(2)),
            super_class: None,
            interfaces: vec![],
            fields: vec![],
            methods: vec![],
            attributes: vec![],
        }
    }

    #[test]
    fn constant_pool_includes_unusable_slots() {
        let classfile = classfile(vec![
            Constant::Utf8(String::from("A")),
            Constant::Class(Utf8ConstantIndex(ConstantIndex(1))),
            Constant::Long(7),
            Constant::Utf8(String::from("after")),
        ]);
        let mut trace = Trace::default();
        trace.visit_constant_pool(&classfile, &classfile.constants);
        assert_eq!(
            trace.0,
            vec!["utf8 #1 A", "class #2", "long #3 7", "unusable #4", "utf8 #5 after"]
        );
    }

    #[test]
    fn frames_visit_locals_then_stack() {
        let classfile = classfile(vec![
            Constant::Utf8(String::from("A")),
            Constant::Class(Utf8ConstantIndex(ConstantIndex(1))),
        ]);
        let frame = StackMapFrame::Full {
            offset_delta: 0,
            locals: vec![VerificationType::Integer, VerificationType::Long],
            stack: vec![VerificationType::Null],
        };
        let mut trace = Trace::default();
        frame.accept(&classfile, &mut trace);
        assert_eq!(trace.0, vec!["type 1", "type 4", "type 5"]);
    }
}
