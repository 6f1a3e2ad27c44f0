//! Assembles class files byte by byte for the integration tests
#![allow(dead_code)]

use byteorder::{BigEndian, WriteBytesExt};
use classreader::jvm::class_file::ClassFile;
use std::collections::HashMap;

pub const ACC_PUBLIC: u16 = 0x0001;
pub const ACC_PRIVATE: u16 = 0x0002;
pub const ACC_PROTECTED: u16 = 0x0004;
pub const ACC_STATIC: u16 = 0x0008;
pub const ACC_FINAL: u16 = 0x0010;
pub const ACC_SUPER: u16 = 0x0020;
pub const ACC_INTERFACE: u16 = 0x0200;
pub const ACC_ABSTRACT: u16 = 0x0400;

pub const REF_INVOKE_STATIC: u8 = 6;

/// Builder for a class file, with a constant pool that deduplicates strings and classes
pub struct ClassBuilder {
    pool: Vec<u8>,
    pool_count: u16,
    utf8s: HashMap<String, u16>,
    classes: HashMap<String, u16>,

    pub major_version: u16,
    pub access_flags: u16,
    this_class: u16,
    super_class: u16,
    interfaces: Vec<u16>,
    fields: Vec<Vec<u8>>,
    methods: Vec<Vec<u8>>,
    attributes: Vec<Vec<u8>>,
}

impl ClassBuilder {
    /// Class with the given internal name, eg. `a/b/C`
    pub fn new(name: &str, superclass: Option<&str>) -> ClassBuilder {
        let mut builder = ClassBuilder {
            pool: vec![],
            pool_count: 1,
            utf8s: HashMap::new(),
            classes: HashMap::new(),
            major_version: 52,
            access_flags: ACC_PUBLIC | ACC_SUPER,
            this_class: 0,
            super_class: 0,
            interfaces: vec![],
            fields: vec![],
            methods: vec![],
            attributes: vec![],
        };
        builder.this_class = builder.class(name);
        if let Some(superclass) = superclass {
            builder.super_class = builder.class(superclass);
        }
        builder
    }

    fn entry(&mut self, width: u16, bytes: Vec<u8>) -> u16 {
        let index = self.pool_count;
        self.pool.extend(bytes);
        self.pool_count += width;
        index
    }

    fn tagged(tag: u8, operands: &[u16]) -> Vec<u8> {
        let mut bytes = vec![tag];
        for operand in operands {
            bytes.write_u16::<BigEndian>(*operand).unwrap();
        }
        bytes
    }

    /// `CONSTANT_Utf8` (ASCII only, which is the same in modified UTF-8)
    pub fn utf8(&mut self, value: &str) -> u16 {
        if let Some(index) = self.utf8s.get(value) {
            return *index;
        }
        let mut bytes = vec![1];
        bytes.write_u16::<BigEndian>(value.len() as u16).unwrap();
        bytes.extend(value.as_bytes());
        let index = self.entry(1, bytes);
        self.utf8s.insert(value.to_owned(), index);
        index
    }

    pub fn class(&mut self, name: &str) -> u16 {
        if let Some(index) = self.classes.get(name) {
            return *index;
        }
        let name_index = self.utf8(name);
        let index = self.entry(1, ClassBuilder::tagged(7, &[name_index]));
        self.classes.insert(name.to_owned(), index);
        index
    }

    pub fn integer(&mut self, value: i32) -> u16 {
        let mut bytes = vec![3];
        bytes.write_i32::<BigEndian>(value).unwrap();
        self.entry(1, bytes)
    }

    /// Takes up two slots
    pub fn long(&mut self, value: i64) -> u16 {
        let mut bytes = vec![5];
        bytes.write_i64::<BigEndian>(value).unwrap();
        self.entry(2, bytes)
    }

    pub fn string(&mut self, value: &str) -> u16 {
        let value_index = self.utf8(value);
        self.entry(1, ClassBuilder::tagged(8, &[value_index]))
    }

    pub fn name_and_type(&mut self, name: &str, descriptor: &str) -> u16 {
        let name_index = self.utf8(name);
        let descriptor_index = self.utf8(descriptor);
        self.entry(1, ClassBuilder::tagged(12, &[name_index, descriptor_index]))
    }

    pub fn field_ref(&mut self, class: &str, name: &str, descriptor: &str) -> u16 {
        let class_index = self.class(class);
        let name_and_type = self.name_and_type(name, descriptor);
        self.entry(1, ClassBuilder::tagged(9, &[class_index, name_and_type]))
    }

    pub fn method_ref(&mut self, class: &str, name: &str, descriptor: &str) -> u16 {
        let class_index = self.class(class);
        let name_and_type = self.name_and_type(name, descriptor);
        self.entry(1, ClassBuilder::tagged(10, &[class_index, name_and_type]))
    }

    pub fn method_handle(&mut self, kind: u8, reference: u16) -> u16 {
        let mut bytes = vec![15, kind];
        bytes.write_u16::<BigEndian>(reference).unwrap();
        self.entry(1, bytes)
    }

    pub fn invoke_dynamic(&mut self, bootstrap_method: u16, name: &str, descriptor: &str) -> u16 {
        let name_and_type = self.name_and_type(name, descriptor);
        self.entry(
            1,
            ClassBuilder::tagged(18, &[bootstrap_method, name_and_type]),
        )
    }

    pub fn interface(&mut self, name: &str) {
        let index = self.class(name);
        self.interfaces.push(index);
    }

    /// Encode an attribute with the given body (the length is computed from the body)
    pub fn attribute(&mut self, name: &str, body: &[u8]) -> Vec<u8> {
        self.attribute_with_length(name, body.len() as u32, body)
    }

    /// Encode an attribute whose declared length may not match its body
    pub fn attribute_with_length(&mut self, name: &str, length: u32, body: &[u8]) -> Vec<u8> {
        let name_index = self.utf8(name);
        let mut bytes = vec![];
        bytes.write_u16::<BigEndian>(name_index).unwrap();
        bytes.write_u32::<BigEndian>(length).unwrap();
        bytes.extend(body);
        bytes
    }

    /// Encode a `Code` attribute without exception handlers
    pub fn code(
        &mut self,
        max_stack: u16,
        max_locals: u16,
        code: &[u8],
        attributes: Vec<Vec<u8>>,
    ) -> Vec<u8> {
        let mut body = vec![];
        body.write_u16::<BigEndian>(max_stack).unwrap();
        body.write_u16::<BigEndian>(max_locals).unwrap();
        body.write_u32::<BigEndian>(code.len() as u32).unwrap();
        body.extend(code);
        body.write_u16::<BigEndian>(0).unwrap();
        write_list(&mut body, &attributes);
        self.attribute("Code", &body)
    }

    /// Encode a `LocalVariableTable` attribute from `(start_pc, length, name, descriptor, slot)`
    pub fn local_variable_table(&mut self, variables: &[(u16, u16, &str, &str, u16)]) -> Vec<u8> {
        let mut body = vec![];
        body.write_u16::<BigEndian>(variables.len() as u16).unwrap();
        for (start_pc, length, name, descriptor, slot) in variables {
            let name_index = self.utf8(name);
            let descriptor_index = self.utf8(descriptor);
            for value in [*start_pc, *length, name_index, descriptor_index, *slot] {
                body.write_u16::<BigEndian>(value).unwrap();
            }
        }
        self.attribute("LocalVariableTable", &body)
    }

    /// Encode a `BootstrapMethods` attribute from `(method handle, arguments)`
    pub fn bootstrap_methods(&mut self, methods: &[(u16, Vec<u16>)]) -> Vec<u8> {
        let mut body = vec![];
        body.write_u16::<BigEndian>(methods.len() as u16).unwrap();
        for (method_ref, arguments) in methods {
            body.write_u16::<BigEndian>(*method_ref).unwrap();
            body.write_u16::<BigEndian>(arguments.len() as u16).unwrap();
            for argument in arguments {
                body.write_u16::<BigEndian>(*argument).unwrap();
            }
        }
        self.attribute("BootstrapMethods", &body)
    }

    pub fn field(
        &mut self,
        access_flags: u16,
        name: &str,
        descriptor: &str,
        attributes: Vec<Vec<u8>>,
    ) {
        let feature = self.feature(access_flags, name, descriptor, attributes);
        self.fields.push(feature);
    }

    pub fn method(
        &mut self,
        access_flags: u16,
        name: &str,
        descriptor: &str,
        attributes: Vec<Vec<u8>>,
    ) {
        let feature = self.feature(access_flags, name, descriptor, attributes);
        self.methods.push(feature);
    }

    fn feature(
        &mut self,
        access_flags: u16,
        name: &str,
        descriptor: &str,
        attributes: Vec<Vec<u8>>,
    ) -> Vec<u8> {
        let name_index = self.utf8(name);
        let descriptor_index = self.utf8(descriptor);
        let mut bytes = vec![];
        bytes.write_u16::<BigEndian>(access_flags).unwrap();
        bytes.write_u16::<BigEndian>(name_index).unwrap();
        bytes.write_u16::<BigEndian>(descriptor_index).unwrap();
        write_list(&mut bytes, &attributes);
        bytes
    }

    pub fn class_attribute(&mut self, attribute: Vec<u8>) {
        self.attributes.push(attribute);
    }

    pub fn build(&self) -> Vec<u8> {
        let mut bytes = vec![];
        bytes.write_u32::<BigEndian>(0xCAFEBABE).unwrap();
        bytes.write_u16::<BigEndian>(0).unwrap();
        bytes.write_u16::<BigEndian>(self.major_version).unwrap();
        bytes.write_u16::<BigEndian>(self.pool_count).unwrap();
        bytes.extend(&self.pool);
        bytes.write_u16::<BigEndian>(self.access_flags).unwrap();
        bytes.write_u16::<BigEndian>(self.this_class).unwrap();
        bytes.write_u16::<BigEndian>(self.super_class).unwrap();
        bytes.write_u16::<BigEndian>(self.interfaces.len() as u16).unwrap();
        for interface in &self.interfaces {
            bytes.write_u16::<BigEndian>(*interface).unwrap();
        }
        write_list(&mut bytes, &self.fields);
        write_list(&mut bytes, &self.methods);
        write_list(&mut bytes, &self.attributes);
        bytes
    }

    pub fn read(&self) -> ClassFile {
        ClassFile::read(&mut self.build().as_slice()).expect("class should decode")
    }
}

fn write_list(bytes: &mut Vec<u8>, items: &[Vec<u8>]) {
    bytes.write_u16::<BigEndian>(items.len() as u16).unwrap();
    for item in items {
        bytes.extend(item);
    }
}
