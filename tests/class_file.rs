mod support;

use classreader::jvm::class_file::{AttributeInfo, ClassFile, Constant, ConstantIndex};
use classreader::jvm::Error;
use std::collections::HashMap;
use support::*;

fn repository(builders: &[&ClassBuilder]) -> HashMap<String, ClassFile> {
    builders
        .iter()
        .map(|builder| {
            let class = builder.read();
            (class.class_name().unwrap(), class)
        })
        .collect()
}

fn u16s(values: &[u16]) -> Vec<u8> {
    values.iter().flat_map(|value| value.to_be_bytes()).collect()
}

#[test]
fn minimal_class() {
    let class = ClassBuilder::new("Empty", Some("java/lang/Object")).read();

    assert_eq!(class.version.major_version, 52);
    assert_eq!(class.class_name().unwrap(), "Empty");
    assert_eq!(class.package_name().unwrap(), "");
    assert!(class.has_superclass());
    assert!(class.interfaces.is_empty());
    assert!(class.fields.is_empty());
    assert!(class.methods.is_empty());
    assert!(class.attributes.is_empty());
    assert_eq!(
        class.declaration().unwrap(),
        "public class Empty extends java.lang.Object"
    );
}

#[test]
fn class_without_superclass() {
    let class = ClassBuilder::new("java/lang/Object", None).read();

    assert!(!class.has_superclass());
    assert_eq!(class.superclass_name().unwrap(), None);
    assert_eq!(class.declaration().unwrap(), "public class java.lang.Object");
}

#[test]
fn wide_constants_leave_unusable_slots() {
    let mut builder = ClassBuilder::new("Wide", None);
    let long = builder.long(1 << 40);
    let after = builder.utf8("after");
    assert_eq!((long, after), (3, 5));

    let class = builder.read();
    let pool = &class.constants;
    assert_eq!(pool.get(3u16).unwrap(), &Constant::Long(1 << 40));
    assert!(matches!(pool.get(4u16), Err(Error::InvalidIndex(4))));
    assert_eq!(pool.get_utf8(ConstantIndex(5)).unwrap(), "after");
    assert!(matches!(pool.get(0u16), Err(Error::InvalidIndex(0))));
    assert!(matches!(pool.get(6u16), Err(Error::InvalidIndex(6))));
}

#[test]
fn bad_magic_number() {
    let mut bytes = ClassBuilder::new("A", None).build();
    bytes[0] = 0xBE;
    assert!(matches!(
        ClassFile::read(&mut bytes.as_slice()),
        Err(Error::MalformedInput(_))
    ));
}

#[test]
fn truncated_class() {
    let bytes = ClassBuilder::new("A", Some("java/lang/Object")).build();
    for length in [3, 9, bytes.len() - 1] {
        assert!(matches!(
            ClassFile::read(&mut &bytes[..length]),
            Err(Error::MalformedInput(_))
        ));
    }
}

#[test]
fn attribute_must_be_consumed_exactly() {
    let mut builder = ClassBuilder::new("A", None);
    let source = builder.utf8("A.java");
    let mut body = source.to_be_bytes().to_vec();
    body.push(0);
    let attribute = builder.attribute("SourceFile", &body);
    builder.class_attribute(attribute);

    assert!(matches!(
        ClassFile::read(&mut builder.build().as_slice()),
        Err(Error::MalformedInput(_))
    ));
}

#[test]
fn attribute_length_past_the_end() {
    let mut builder = ClassBuilder::new("A", None);
    let source = builder.utf8("A.java");
    let attribute = builder.attribute_with_length("SourceFile", 200, &source.to_be_bytes());
    builder.class_attribute(attribute);

    assert!(matches!(
        ClassFile::read(&mut builder.build().as_slice()),
        Err(Error::MalformedInput(_))
    ));
}

#[test]
fn known_and_custom_attributes() {
    let mut builder = ClassBuilder::new("A", None);
    let source = builder.utf8("A.java");
    let source_file = builder.attribute("SourceFile", &source.to_be_bytes());
    let custom = builder.attribute("org.example.Marker", &[1, 2, 3]);
    let deprecated = builder.attribute("Deprecated", &[]);
    builder.class_attribute(source_file);
    builder.class_attribute(custom);
    builder.class_attribute(deprecated);

    let class = builder.read();
    assert_eq!(class.source_file().unwrap(), Some("A.java"));
    assert!(class.is_deprecated());
    assert_eq!(class.attributes[1].info, AttributeInfo::Custom(vec![1, 2, 3]));
    assert_eq!(
        class.attributes[1].name(&class.constants).unwrap(),
        "org.example.Marker"
    );
}

#[test]
fn class_declarations() {
    let mut interface = ClassBuilder::new("a/I", Some("java/lang/Object"));
    interface.access_flags = ACC_PUBLIC | ACC_INTERFACE | ACC_ABSTRACT;
    interface.interface("a/J");
    interface.interface("a/K");
    assert_eq!(
        interface.read().declaration().unwrap(),
        "public interface a.I extends a.J, a.K"
    );

    let mut class = ClassBuilder::new("a/B", Some("a/C"));
    class.access_flags = ACC_PUBLIC | ACC_ABSTRACT | ACC_SUPER;
    class.interface("a/I");
    assert_eq!(
        class.read().declaration().unwrap(),
        "public abstract class a.B extends a.C implements a.I"
    );
}

#[test]
fn feature_declarations() {
    let mut builder = ClassBuilder::new("a/Point", Some("java/lang/Object"));
    let max = builder.integer(10);
    let constant_value = builder.attribute("ConstantValue", &max.to_be_bytes());
    builder.field(
        ACC_PRIVATE | ACC_STATIC | ACC_FINAL,
        "MAX",
        "I",
        vec![constant_value],
    );
    let greeting = builder.string("hi");
    let constant_value = builder.attribute("ConstantValue", &greeting.to_be_bytes());
    builder.field(
        ACC_PUBLIC | ACC_STATIC | ACC_FINAL,
        "GREETING",
        "Ljava/lang/String;",
        vec![constant_value],
    );
    builder.field(ACC_PROTECTED, "names", "[Ljava/lang/String;", vec![]);

    builder.method(ACC_PUBLIC, "<init>", "(II)V", vec![]);
    builder.method(ACC_STATIC, "<clinit>", "()V", vec![]);
    let io_exception = builder.class("java/io/IOException");
    let exceptions = builder.attribute("Exceptions", &u16s(&[1, io_exception]));
    builder.method(
        ACC_PUBLIC | ACC_STATIC,
        "main",
        "([Ljava/lang/String;)V",
        vec![exceptions],
    );

    let class = builder.read();
    let fields: Vec<String> = class
        .fields
        .iter()
        .map(|field| field.declaration(&class).unwrap())
        .collect();
    assert_eq!(
        fields,
        vec![
            "private static final int MAX = 10",
            "public static final java.lang.String GREETING = \"hi\"",
            "protected java.lang.String[] names",
        ]
    );

    let methods: Vec<String> = class
        .methods
        .iter()
        .map(|method| method.declaration(&class).unwrap())
        .collect();
    assert_eq!(
        methods,
        vec![
            "public Point(int, int)",
            "static {}",
            "public static void main(java.lang.String[]) throws java.io.IOException",
        ]
    );

    let main = class.method("main(java.lang.String[])").unwrap().unwrap();
    assert_eq!(main.full_name(&class).unwrap(), "a.Point.main");
    assert_eq!(main.return_type(&class).unwrap(), "void");
    assert!(class.method("main()").unwrap().is_none());
    assert!(class.field("names").unwrap().unwrap().is_protected());
}

#[test]
fn locate_inherited_methods() {
    let mut base = ClassBuilder::new("a/Base", Some("java/lang/Object"));
    base.method(ACC_PUBLIC, "run", "()V", vec![]);
    base.method(0, "helper", "()V", vec![]);
    base.method(ACC_PRIVATE, "secret", "()V", vec![]);

    let mut shape = ClassBuilder::new("a/Shape", None);
    shape.access_flags = ACC_PUBLIC | ACC_INTERFACE | ACC_ABSTRACT;
    shape.method(ACC_PUBLIC | ACC_ABSTRACT, "area", "()D", vec![]);

    let mut elsewhere = ClassBuilder::new("b/Derived", Some("a/Base"));
    elsewhere.interface("a/Shape");
    let same_package = ClassBuilder::new("a/Sibling", Some("a/Base"));

    let repository = repository(&[&base, &shape, &elsewhere, &same_package]);
    let derived = &repository["b.Derived"];
    let sibling = &repository["a.Sibling"];

    let (owner, method) = derived.locate_method("run()", &repository).unwrap().unwrap();
    assert_eq!(owner.class_name().unwrap(), "a.Base");
    assert_eq!(method.name(owner).unwrap(), "run");

    let (owner, _) = derived.locate_method("area()", &repository).unwrap().unwrap();
    assert_eq!(owner.class_name().unwrap(), "a.Shape");

    assert!(derived.locate_method("helper()", &repository).unwrap().is_none());
    assert!(sibling.locate_method("helper()", &repository).unwrap().is_some());
    assert!(sibling.locate_method("secret()", &repository).unwrap().is_none());
    assert!(derived.locate_method("missing()", &repository).unwrap().is_none());
}

#[test]
fn locate_field_in_cyclic_hierarchy() {
    let mut first = ClassBuilder::new("a/First", Some("a/Second"));
    first.field(ACC_PUBLIC, "x", "I", vec![]);
    let second = ClassBuilder::new("a/Second", Some("a/First"));

    let repository = repository(&[&first, &second]);
    let second = &repository["a.Second"];

    let (owner, field) = second.locate_field("x", &repository).unwrap().unwrap();
    assert_eq!(owner.class_name().unwrap(), "a.First");
    assert_eq!(field.type_name(owner).unwrap(), "int");
    assert!(second.locate_field("y", &repository).unwrap().is_none());
}

#[test]
fn locate_method_in_diamond_hierarchy() {
    let interface = |name: &str, parents: &[&str]| {
        let mut builder = ClassBuilder::new(name, None);
        builder.access_flags = ACC_PUBLIC | ACC_INTERFACE | ACC_ABSTRACT;
        for parent in parents {
            builder.interface(parent);
        }
        builder
    };
    let mut top = interface("a/Top", &[]);
    top.method(ACC_PUBLIC | ACC_ABSTRACT, "size", "()I", vec![]);
    let left = interface("a/Left", &["a/Top"]);
    let mut right = interface("a/Right", &["a/Top"]);
    right.method(ACC_PUBLIC | ACC_ABSTRACT, "name", "()Ljava/lang/String;", vec![]);

    let mut both = ClassBuilder::new("a/Both", Some("java/lang/Object"));
    both.interface("a/Left");
    both.interface("a/Right");

    let repository = repository(&[&top, &left, &right, &both]);
    let both = &repository["a.Both"];

    let (owner, _) = both.locate_method("size()", &repository).unwrap().unwrap();
    assert_eq!(owner.class_name().unwrap(), "a.Top");

    // `a.Top` was already searched through `a.Left`, `a.Right` is still searched
    let (owner, _) = both.locate_method("name()", &repository).unwrap().unwrap();
    assert_eq!(owner.class_name().unwrap(), "a.Right");
    assert!(both.locate_method("missing()", &repository).unwrap().is_none());
}
