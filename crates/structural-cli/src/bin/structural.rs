//! `structural` — a thin driver over `structural-types`/`structural-convert`
//! (`SPEC_FULL.md` §6): builds a small demo annotation program, runs it
//! through the orchestrator, pretty-prints the emitted descriptor
//! constructors, and checks a couple of sample values against the result.
//! Mirrors the teacher's `tsz-cli` role: no new type-system semantics live
//! here, only wiring.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};

use structural_convert::{
    render_program, run, Declaration, FunctionDecl, FunctionTypeAnnotation, ObjectMember,
    ObjectTypeAnnotation, OrchestratorConfig, ParamDecl, Program, TypeAliasDecl, TypeAnnotation,
};
use structural_types::{AssertionMode, Value};

#[derive(Parser, Debug)]
#[command(name = "structural", version, about = "Demo driver for the structural runtime type system")]
struct CliArgs {
    /// Assertion mode the demo program's root context runs under.
    #[arg(long, value_enum, default_value_t = Mode::Assert)]
    mode: Mode,

    /// Print the emitted descriptor-constructor expressions before running
    /// the sample checks.
    #[arg(long)]
    render: bool,

    /// Print each descriptor's `toJSON()` tree alongside the render output.
    #[arg(long)]
    json: bool,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum Mode {
    Off,
    Warn,
    Assert,
}

impl From<Mode> for AssertionMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Off => AssertionMode::Off,
            Mode::Warn => AssertionMode::Warn,
            Mode::Assert => AssertionMode::Assert,
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| "structural=info,warn".to_string()))
        .init();
    let args = CliArgs::parse();

    let program = demo_program();
    let config = OrchestratorConfig {
        assertion_mode: args.mode.into(),
        ..OrchestratorConfig::default()
    };

    if args.render {
        println!("{}", render_program(&program));
        println!();
    }

    let output = run(&program, &config).context("failed to convert the demo program")?;
    for diagnostic in &output.diagnostics {
        tracing::warn!(code = diagnostic.code, message = %diagnostic.message, "diagnostic");
    }

    let bindings: std::collections::HashMap<_, _> = output.bindings.iter().cloned().collect();

    let thing = *bindings.get("Thing").expect("demo program declares Thing");
    if args.json {
        println!("Thing toJSON: {}", output.root.to_json(thing));
    }

    let ok = Value::object([
        ("id".into(), Value::Number(1.0)),
        ("tag".into(), Value::string("ok")),
    ]);
    let bad = Value::object([("id".into(), Value::Number(1.0)), ("tag".into(), Value::Bool(true))]);

    println!("Thing accepts {{id: 1, tag: \"ok\"}}  -> {}", output.root.accepts(thing, &ok));
    println!("Thing accepts {{id: 1, tag: true}}    -> {}", output.root.accepts(thing, &bad));

    match output.root.check(thing, bad) {
        Ok(_) => println!("check() unexpectedly accepted the bad value"),
        Err(err) => println!("check() reported: {err}"),
    }

    Ok(())
}

/// A small representative program exercising a union field (`Thing`), a
/// self-referential alias (`Tree`), and a generic function parameter
/// (`sum`) — the same shapes as the seeded end-to-end scenarios this crate
/// tests against.
fn demo_program() -> Program {
    let thing = TypeAliasDecl {
        name: "Thing".to_string(),
        type_params: vec![],
        body: TypeAnnotation::Object(ObjectTypeAnnotation {
            members: vec![
                ObjectMember::Property {
                    name: "id".to_string(),
                    type_annotation: TypeAnnotation::Number,
                    optional: false,
                },
                ObjectMember::Property {
                    name: "tag".to_string(),
                    type_annotation: TypeAnnotation::Union(vec![TypeAnnotation::String, TypeAnnotation::Number]),
                    optional: false,
                },
            ],
            string_index: None,
            number_index: None,
            call_signature: None,
            exact: false,
        }),
        is_interface: false,
    };

    let tree = TypeAliasDecl {
        name: "Tree".to_string(),
        type_params: vec![],
        body: TypeAnnotation::Object(ObjectTypeAnnotation {
            members: vec![
                ObjectMember::Property {
                    name: "value".to_string(),
                    type_annotation: TypeAnnotation::Number,
                    optional: false,
                },
                ObjectMember::Property {
                    name: "children".to_string(),
                    type_annotation: TypeAnnotation::Generic {
                        name: "Array".to_string(),
                        args: vec![TypeAnnotation::Generic {
                            name: "Tree".to_string(),
                            args: vec![],
                        }],
                    },
                    optional: false,
                },
            ],
            string_index: None,
            number_index: None,
            call_signature: None,
            exact: false,
        }),
        is_interface: false,
    };

    let sum = FunctionDecl {
        name: "sum".to_string(),
        type_params: vec![],
        signature: FunctionTypeAnnotation {
            params: vec![ParamDecl {
                name: "xs".to_string(),
                type_annotation: TypeAnnotation::Generic {
                    name: "Array".to_string(),
                    args: vec![TypeAnnotation::Number],
                },
                optional: false,
            }],
            rest: None,
            return_type: Some(Box::new(TypeAnnotation::Number)),
        },
    };

    Program {
        declarations: vec![
            Declaration::TypeAlias(thing),
            Declaration::TypeAlias(tree),
            Declaration::Function(sum),
        ],
    }
}
