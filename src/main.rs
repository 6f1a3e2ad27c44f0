use classreader::jvm::class_file::{ClassFile, Code, ConstantPool, Field, Method};
use classreader::jvm::{self, bytecode::Instruction, Visitor};
use classreader::loader::{ClassFileLoader, LoaderSettings};

use clap::{value_parser, Arg, ArgAction, Command};
use std::path::PathBuf;

fn main() {
    env_logger::init();

    let matches = Command::new("classdump")
        .version(clap::crate_version!())
        .about("Prints the declarations found in JVM class files, directories, and JARs")
        .arg(
            Arg::new("target jdk")
                .long("target-jdk")
                .value_name("VERSION")
                .value_parser(value_parser!(u16))
                .help("Sets the JDK release used to pick classes out of multi-release JARs"),
        )
        .arg(
            Arg::new("constant pool")
                .long("constant-pool")
                .action(ArgAction::SetTrue)
                .help("Also prints the constant pool of every class"),
        )
        .arg(
            Arg::new("code")
                .long("code")
                .action(ArgAction::SetTrue)
                .help("Also prints the instructions of every method"),
        )
        .arg(
            Arg::new("INPUT")
                .help("Sets the class files, directories, or archives to read")
                .value_parser(value_parser!(PathBuf))
                .num_args(1..)
                .required(true),
        )
        .get_matches();

    let settings = LoaderSettings {
        target_jdk: matches.get_one::<u16>("target jdk").copied(),
    };
    let inputs: Vec<PathBuf> = matches
        .get_many::<PathBuf>("INPUT")
        .map(|paths| paths.cloned().collect())
        .unwrap_or_default();

    let mut loader = ClassFileLoader::new(settings);
    loader.load(&inputs, &mut ());
    log::info!("Loaded {} classes", loader.len());

    let mut printer = Printer {
        constant_pool: matches.get_flag("constant pool"),
        code: matches.get_flag("code"),
        indent: 0,
    };
    jvm::visit_classfiles(&mut printer, loader.classfiles());
}

/// Prints a Java-like outline of each class it visits
struct Printer {
    constant_pool: bool,
    code: bool,
    indent: usize,
}

impl Printer {
    fn line(&self, text: &str) {
        println!("{:width$}{}", "", text, width = self.indent * 4);
    }

    /// Print the rendering, or the error that prevented it
    fn render(&self, rendered: jvm::Result<String>, suffix: &str) {
        match rendered {
            Ok(text) => self.line(&format!("{}{}", text, suffix)),
            Err(err) => self.line(&format!("/* {} */", err)),
        }
    }
}

impl<'a> Visitor<'a> for Printer {
    fn visit_classfile(&mut self, classfile: &'a ClassFile) {
        if let Ok(Some(source)) = classfile.source_file() {
            self.line(&format!("// Compiled from {}", source));
        }
        self.line(&format!("// Class file version {}", classfile.version));
        self.render(classfile.declaration(), " {");
        self.indent += 1;
        if self.constant_pool {
            self.visit_constant_pool(classfile, &classfile.constants);
        }
        jvm::walk_classfile(self, classfile);
        self.indent -= 1;
        self.line("}");
        println!();
    }

    fn visit_constant_pool(&mut self, _classfile: &'a ClassFile, pool: &'a ConstantPool) {
        for (index, constant) in pool.iter() {
            let rendered = constant
                .render(pool)
                .unwrap_or_else(|err| format!("/* {} */", err));
            self.line(&format!("// {:>5} = {:<18} {}", index, constant.kind(), rendered));
        }
    }

    fn visit_field(&mut self, classfile: &'a ClassFile, field: &'a Field) {
        self.render(field.declaration(classfile), ";");
    }

    fn visit_method(&mut self, classfile: &'a ClassFile, method: &'a Method) {
        if self.code && method.code().is_some() {
            self.render(method.declaration(classfile), " {");
            self.indent += 1;
            jvm::walk_method(self, classfile, method);
            self.indent -= 1;
            self.line("}");
        } else {
            self.render(method.declaration(classfile), ";");
        }
    }

    // Only the class, field, and method attributes reachable from here are walked, so attributes
    // other than the method body print nothing.
    fn visit_code_attribute(&mut self, classfile: &'a ClassFile, code: &'a Code) {
        for instruction in code.instructions() {
            self.visit_instruction(classfile, instruction);
        }
    }

    fn visit_instruction(&mut self, classfile: &'a ClassFile, instruction: Instruction<'a>) {
        let mut text = format!("{:>5}: {}", instruction.start(), instruction);
        match instruction.indexed_constant_pool_entry(&classfile.constants) {
            Ok(Some(constant)) => match constant.render(&classfile.constants) {
                Ok(rendered) => text.push_str(&format!(" {}", rendered)),
                Err(err) => text.push_str(&format!(" /* {} */", err)),
            },
            Ok(None) => {
                if let Some(index) = instruction.index() {
                    text.push_str(&format!(" {}", index));
                }
                if let Some(value) = instruction.value() {
                    text.push_str(&format!(" {}", value));
                }
                if let Some(offset) = instruction.offset() {
                    text.push_str(&format!(" {}", instruction.start() as i64 + offset as i64));
                }
            }
            Err(err) => text.push_str(&format!(" /* {} */", err)),
        }
        if let Some(variable) = instruction.indexed_local_variable() {
            if let Ok(name) = variable.name(&classfile.constants) {
                text.push_str(&format!(" // {}", name));
            }
        }
        self.line(&text);
    }
}
