// SPDX-License-Identifier: MIT OR Apache-2.0
//! End-to-end compiles of small graphs.

use ordoplay_shader_compiler::{Backend, CompileError, CompilerSettings, ShaderCompiler};
use ordoplay_shader_graph::{
    BranchHint, ConditionalOperator, DataUsage, Graph, Node, NodeId, NodeKind, Port, RenderState,
    ValueType,
};

fn compiler(backend: Backend) -> ShaderCompiler {
    ShaderCompiler::new(CompilerSettings::for_backend(backend))
}

fn pixel_output(graph: &mut Graph) -> NodeId {
    graph.add_node(Node::new(NodeKind::PixelOutput {
        state: RenderState::default(),
    }))
}

fn uniform(graph: &mut Graph, name: &str, ty: ValueType) -> NodeId {
    graph.add_node(Node::new(NodeKind::Uniform {
        parameter: name.to_string(),
        ty,
    }))
}

fn scalar(graph: &mut Graph, value: f32) -> NodeId {
    graph.add_node(Node::new(NodeKind::Scalar { value }))
}

fn connect(graph: &mut Graph, from: NodeId, from_pin: &str, to: NodeId, to_pin: &str) {
    graph.connect_by_name(from, from_pin, to, to_pin).unwrap();
}

fn uniform_color_graph() -> Graph {
    let mut graph = Graph::new("UniformColor");
    let color = uniform(&mut graph, "Color", ValueType::Vec4);
    let output = pixel_output(&mut graph);
    connect(&mut graph, color, "Output", output, "Input");
    graph
}

#[test]
fn test_uniform_color_glsl() {
    let artifact = compiler(Backend::Glsl).compile(&uniform_color_graph()).unwrap();

    assert_eq!(
        artifact.pixel_source,
        "#version 330\n\
         \n\
         // Uniforms\n\
         uniform vec4 Color;\n\
         \n\
         // Outputs\n\
         layout(location = 0) out vec4 _gl_FragData_0;\n\
         \n\
         void main()\n\
         {\n\
         \t_gl_FragData_0 = Color;\n\
         }\n"
    );
    assert_eq!(artifact.vertex_source, "#version 330\n\nvoid main()\n{\n}\n");
    assert_eq!(artifact.uniforms.len(), 1);
    assert_eq!(artifact.uniform("Color").unwrap().ty, ValueType::Vec4);
    assert!(artifact.samplers.is_empty());
    assert_eq!(artifact.interpolator_count, 0);
    assert_eq!(artifact.render_state, RenderState::default());
}

#[test]
fn test_uniform_color_hlsl() {
    let artifact = compiler(Backend::Hlsl).compile(&uniform_color_graph()).unwrap();

    assert!(artifact.pixel_source.contains("uniform float4 Color;\n"));
    assert!(artifact
        .pixel_source
        .contains("struct PixelOutput\n{\n\tfloat4 Color0 : SV_Target0;\n};\n"));
    assert!(artifact.pixel_source.contains(
        "PixelOutput main(PixelInput i)\n{\n\tPixelOutput o = (PixelOutput)0;\n\to.Color0 = Color;\n\treturn o;\n}\n"
    ));
    assert!(artifact.vertex_source.contains("VertexOutput main()\n"));
}

#[test]
fn test_uniform_color_glsl_es() {
    let artifact = compiler(Backend::GlslEs).compile(&uniform_color_graph()).unwrap();

    assert!(artifact
        .pixel_source
        .starts_with("#version 100\nprecision highp float;\n"));
    assert!(artifact.pixel_source.contains("\tgl_FragColor = Color;\n"));
    assert!(!artifact.pixel_source.contains("// Outputs"));
}

#[test]
fn test_compile_is_deterministic() {
    let graph = uniform_color_graph();
    let compiler = compiler(Backend::Glsl);
    let first = compiler.compile(&graph).unwrap();
    let second = compiler.compile(&graph).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_shared_producer_emitted_once() {
    let mut graph = Graph::default();
    let two = scalar(&mut graph, 2.0);
    let add = graph.add_node(Node::new(NodeKind::Add));
    let output = pixel_output(&mut graph);
    connect(&mut graph, two, "Output", add, "Input1");
    connect(&mut graph, two, "Output", add, "Input2");
    connect(&mut graph, add, "Output", output, "Input");

    let artifact = compiler(Backend::Glsl).compile(&graph).unwrap();
    assert!(artifact.pixel_source.contains(
        "\tconst float v0 = 2.0;\n\
         \tfloat v1 = v0 + v0;\n\
         \t_gl_FragData_0 = vec4(v1);\n"
    ));
}

#[test]
fn test_uniform_declared_once_per_name() {
    let mut graph = Graph::default();
    let first = uniform(&mut graph, "Color", ValueType::Vec4);
    let second = uniform(&mut graph, "Color", ValueType::Vec4);
    let add = graph.add_node(Node::new(NodeKind::Add));
    let output = pixel_output(&mut graph);
    connect(&mut graph, first, "Output", add, "Input1");
    connect(&mut graph, second, "Output", add, "Input2");
    connect(&mut graph, add, "Output", output, "Input");

    let artifact = compiler(Backend::Glsl).compile(&graph).unwrap();
    assert_eq!(artifact.uniforms.len(), 1);
    assert_eq!(artifact.pixel_source.matches("uniform vec4 Color;").count(), 1);
    assert!(artifact.pixel_source.contains("	vec4 v0 = Color + Color;
"));
}

#[test]
fn test_mixed_widths_promote() {
    let mut graph = Graph::default();
    let half = scalar(&mut graph, 0.5);
    let tint = uniform(&mut graph, "Tint", ValueType::Vec3);
    let mul = graph.add_node(Node::new(NodeKind::Mul));
    let output = pixel_output(&mut graph);
    connect(&mut graph, half, "Output", mul, "Input1");
    connect(&mut graph, tint, "Output", mul, "Input2");
    connect(&mut graph, mul, "Output", output, "Input");

    let artifact = compiler(Backend::Glsl).compile(&graph).unwrap();
    assert!(artifact.pixel_source.contains("\tvec3 v1 = vec3(v0) * Tint;\n"));
    assert!(artifact
        .pixel_source
        .contains("\t_gl_FragData_0 = vec4(v1, 0.0);\n"));
}

#[test]
fn test_conditional_branches() {
    let mut graph = Graph::default();
    let input = scalar(&mut graph, 0.5);
    let reference = scalar(&mut graph, 0.0);
    let red = graph.add_node(Node::new(NodeKind::Color {
        rgba: [1.0, 0.0, 0.0, 1.0],
    }));
    let tint = uniform(&mut graph, "Tint", ValueType::Vec4);
    let conditional = graph.add_node(Node::new(NodeKind::Conditional {
        operator: ConditionalOperator::Greater,
        branch: BranchHint::Auto,
    }));
    let output = pixel_output(&mut graph);
    connect(&mut graph, input, "Output", conditional, "Input");
    connect(&mut graph, reference, "Output", conditional, "Reference");
    connect(&mut graph, red, "Output", conditional, "CaseTrue");
    connect(&mut graph, tint, "Output", conditional, "CaseFalse");
    connect(&mut graph, conditional, "Output", output, "Input");

    let artifact = compiler(Backend::Glsl).compile(&graph).unwrap();
    assert!(artifact.pixel_source.contains(
        "\tconst float v0 = 0.5;\n\
         \tconst float v1 = 0.0;\n\
         \tvec4 v3;\n\
         \tif (v0 > v1)\n\
         \t{\n\
         \t\tconst vec4 v2 = vec4(1.0, 0.0, 0.0, 1.0);\n\
         \t\tv3 = v2;\n\
         \t}\n\
         \telse\n\
         \t{\n\
         \t\tv3 = Tint;\n\
         \t}\n\
         \t_gl_FragData_0 = v3;\n"
    ));
    assert_eq!(artifact.uniforms.len(), 1);
}

#[test]
fn test_conditional_promotes_scalar_branch() {
    let mut graph = Graph::default();
    let mask = uniform(&mut graph, "Mask", ValueType::Scalar);
    let cutoff = uniform(&mut graph, "Cutoff", ValueType::Scalar);
    let a = uniform(&mut graph, "A", ValueType::Vec4);
    let b = uniform(&mut graph, "B", ValueType::Vec4);
    let add = graph.add_node(Node::new(NodeKind::Add));
    let half = scalar(&mut graph, 0.5);
    let conditional = graph.add_node(Node::new(NodeKind::Conditional {
        operator: ConditionalOperator::Less,
        branch: BranchHint::Auto,
    }));
    let output = pixel_output(&mut graph);
    connect(&mut graph, a, "Output", add, "Input1");
    connect(&mut graph, b, "Output", add, "Input2");
    connect(&mut graph, mask, "Output", conditional, "Input");
    connect(&mut graph, cutoff, "Output", conditional, "Reference");
    connect(&mut graph, add, "Output", conditional, "CaseTrue");
    connect(&mut graph, half, "Output", conditional, "CaseFalse");
    connect(&mut graph, conditional, "Output", output, "Input");

    let artifact = compiler(Backend::Glsl).compile(&graph).unwrap();
    assert!(artifact.pixel_source.contains(
        "\tvec4 v2;\n\
         \tif (Mask < Cutoff)\n\
         \t{\n\
         \t\tvec4 v0 = A + B;\n\
         \t\tv2 = v0;\n\
         \t}\n\
         \telse\n\
         \t{\n\
         \t\tconst float v1 = 0.5;\n\
         \t\tv2 = vec4(v1);\n\
         \t}\n\
         \t_gl_FragData_0 = v2;\n"
    ));
}

#[test]
fn test_branch_values_stay_in_their_scope() {
    let mut graph = Graph::default();
    let mask = uniform(&mut graph, "Mask", ValueType::Scalar);
    let cutoff = uniform(&mut graph, "Cutoff", ValueType::Scalar);
    let a = uniform(&mut graph, "A", ValueType::Vec4);
    let b = uniform(&mut graph, "B", ValueType::Vec4);
    let add = graph.add_node(Node::new(NodeKind::Add));
    let half = scalar(&mut graph, 0.5);
    let conditional = graph.add_node(Node::new(NodeKind::Conditional {
        operator: ConditionalOperator::Less,
        branch: BranchHint::Auto,
    }));
    let mul = graph.add_node(Node::new(NodeKind::Mul));
    let output = pixel_output(&mut graph);
    connect(&mut graph, a, "Output", add, "Input1");
    connect(&mut graph, b, "Output", add, "Input2");
    connect(&mut graph, mask, "Output", conditional, "Input");
    connect(&mut graph, cutoff, "Output", conditional, "Reference");
    connect(&mut graph, add, "Output", conditional, "CaseTrue");
    connect(&mut graph, half, "Output", conditional, "CaseFalse");
    connect(&mut graph, conditional, "Output", mul, "Input1");
    connect(&mut graph, add, "Output", mul, "Input2");
    connect(&mut graph, mul, "Output", output, "Input");

    let artifact = compiler(Backend::Glsl).compile(&graph).unwrap();
    let source = &artifact.pixel_source;
    assert!(source.contains("\t\tvec4 v0 = A + B;\n\t\tv2 = v0;\n"));
    assert!(source.contains(
        "\t}\n\
         \tvec4 v3 = A + B;\n\
         \tvec4 v4 = v2 * v3;\n\
         \t_gl_FragData_0 = v4;\n"
    ));
    assert_eq!(source.matches("v0").count(), 2);
}

#[test]
fn test_switch_cases_cast_to_common_type() {
    let mut graph = Graph::default();
    let mode = uniform(&mut graph, "Mode", ValueType::Scalar);
    let red = graph.add_node(Node::new(NodeKind::Color {
        rgba: [1.0, 0.0, 0.0, 1.0],
    }));
    let quarter = scalar(&mut graph, 0.25);
    let tint = uniform(&mut graph, "Tint", ValueType::Vec3);
    let switch = graph.add_node(Node::new(NodeKind::Switch {
        cases: vec![0, 1],
        branch: BranchHint::Auto,
    }));
    let output = pixel_output(&mut graph);
    connect(&mut graph, mode, "Output", switch, "Select");
    connect(&mut graph, red, "Output", switch, "Case 0");
    connect(&mut graph, quarter, "Output", switch, "Case 1");
    connect(&mut graph, tint, "Output", switch, "Default");
    connect(&mut graph, switch, "Output", output, "Input");

    let artifact = compiler(Backend::Glsl).compile(&graph).unwrap();
    let source = &artifact.pixel_source;
    assert!(source.contains("\tvec4 v2;\n\tif (int(Mode) == 0)\n"));
    assert!(source.contains("\telse if (int(Mode) == 1)\n"));
    assert!(source.contains("\t\tconst float v1 = 0.25;\n\t\tv2 = vec4(v1);\n"));
    assert!(source.contains("\telse\n\t{\n\t\tv2 = vec4(Tint, 0.0);\n\t}\n"));
}

#[test]
fn test_switch_rejects_duplicate_cases() {
    let mut graph = Graph::default();
    let mode = uniform(&mut graph, "Mode", ValueType::Scalar);
    let tint = uniform(&mut graph, "Tint", ValueType::Vec4);
    let switch = graph.add_node(Node::new(NodeKind::Switch {
        cases: vec![2, 2],
        branch: BranchHint::Auto,
    }));
    let output = pixel_output(&mut graph);
    connect(&mut graph, mode, "Output", switch, "Select");
    connect(&mut graph, tint, "Output", switch, "Default");
    connect(&mut graph, switch, "Output", output, "Input");

    assert!(matches!(
        compiler(Backend::Glsl).compile(&graph),
        Err(CompileError::InvalidGraph(_))
    ));
}

#[test]
fn test_discard_keeps_passing_pixels() {
    let mut graph = Graph::default();
    let alpha = uniform(&mut graph, "Alpha", ValueType::Scalar);
    let cutoff = scalar(&mut graph, 0.5);
    let color = uniform(&mut graph, "Color", ValueType::Vec4);
    let discard = graph.add_node(Node::new(NodeKind::Discard {
        operator: ConditionalOperator::Greater,
    }));
    let output = pixel_output(&mut graph);
    connect(&mut graph, alpha, "Output", discard, "Input");
    connect(&mut graph, cutoff, "Output", discard, "Reference");
    connect(&mut graph, color, "Output", discard, "Pass");
    connect(&mut graph, discard, "Output", output, "Input");

    let artifact = compiler(Backend::Glsl).compile(&graph).unwrap();
    assert!(artifact.pixel_source.contains(
        "\tconst float v0 = 0.5;\n\
         \tif (!(Alpha > v0)) discard;\n\
         \t_gl_FragData_0 = Color;\n"
    ));
}

#[test]
fn test_shared_branch_work_is_hoisted() {
    let mut graph = Graph::default();
    let selector = scalar(&mut graph, 1.0);
    let tint = uniform(&mut graph, "Tint", ValueType::Vec4);
    let normalize = graph.add_node(Node::new(NodeKind::Normalize));
    let negate = graph.add_node(Node::new(NodeKind::Neg));
    let conditional = graph.add_node(Node::new(NodeKind::Conditional {
        operator: ConditionalOperator::Equal,
        branch: BranchHint::Auto,
    }));
    let output = pixel_output(&mut graph);
    connect(&mut graph, tint, "Output", normalize, "Input");
    connect(&mut graph, normalize, "Output", negate, "Input");
    connect(&mut graph, selector, "Output", conditional, "Input");
    connect(&mut graph, selector, "Output", conditional, "Reference");
    connect(&mut graph, normalize, "Output", conditional, "CaseTrue");
    connect(&mut graph, negate, "Output", conditional, "CaseFalse");
    connect(&mut graph, conditional, "Output", output, "Input");

    let artifact = compiler(Backend::Glsl).compile(&graph).unwrap();
    let source = &artifact.pixel_source;
    assert_eq!(source.matches("normalize(").count(), 1);
    let normalized = source.find("normalize(").unwrap();
    let branch = source.find("\tif (").unwrap();
    assert!(normalized < branch);
}

#[test]
fn test_iterate_loop() {
    let mut graph = Graph::default();
    let one = scalar(&mut graph, 1.0);
    let add = graph.add_node(Node::new(NodeKind::Add));
    let iterate = graph.add_node(Node::new(NodeKind::Iterate { from: 0, to: 3 }));
    let output = pixel_output(&mut graph);
    connect(&mut graph, iterate, "N", add, "Input1");
    connect(&mut graph, one, "Output", add, "Input2");
    connect(&mut graph, add, "Output", iterate, "Input");
    connect(&mut graph, iterate, "Output", output, "Input");

    let artifact = compiler(Backend::Glsl).compile(&graph).unwrap();
    assert!(artifact.pixel_source.contains(
        "\tconst float v0 = 1.0;\n\
         \tfloat v1 = 0.0;\n\
         \tfor (float v2 = 0.0; v2 <= 3.0; ++v2)\n\
         \t{\n\
         \t\tfloat v3 = v2 + v0;\n\
         \t\tv1 = v3;\n\
         \t}\n\
         \t_gl_FragData_0 = vec4(v1);\n"
    ));
}

#[test]
fn test_loop_body_reads_its_own_output() {
    let mut graph = Graph::default();
    let step = uniform(&mut graph, "C", ValueType::Vec4);
    let add = graph.add_node(Node::new(NodeKind::Add));
    let iterate = graph.add_node(Node::new(NodeKind::Iterate { from: 0, to: 3 }));
    let output = pixel_output(&mut graph);
    connect(&mut graph, iterate, "Output", add, "Input1");
    connect(&mut graph, step, "Output", add, "Input2");
    connect(&mut graph, add, "Output", iterate, "Input");
    connect(&mut graph, iterate, "Output", output, "Input");

    let artifact = compiler(Backend::Glsl).compile(&graph).unwrap();
    assert!(artifact.pixel_source.contains(
        "\tvec4 v0 = vec4(0.0);\n\
         \tfor (float v1 = 0.0; v1 <= 3.0; ++v1)\n\
         \t{\n\
         \t\tvec4 v2 = v0 + C;\n\
         \t\tv0 = v2;\n\
         \t}\n\
         \t_gl_FragData_0 = v0;\n"
    ));
}

#[test]
fn test_sum_accumulates_with_unroll_hint() {
    let mut graph = Graph::default();
    let sum = graph.add_node(Node::new(NodeKind::Sum { from: 1, to: 4 }));
    let abs = graph.add_node(Node::new(NodeKind::Abs));
    let output = pixel_output(&mut graph);
    connect(&mut graph, sum, "N", abs, "Input");
    connect(&mut graph, abs, "Output", sum, "Input");
    connect(&mut graph, sum, "Output", output, "Input");

    let artifact = compiler(Backend::Hlsl).compile(&graph).unwrap();
    assert!(artifact.pixel_source.contains(
        "\tfloat v0 = 0.0;\n\
         \t[unroll]\n\
         \tfor (float v1 = 1.0; v1 <= 4.0; ++v1)\n\
         \t{\n\
         \t\tfloat v2 = abs(v1);\n\
         \t\tv0 += v2;\n\
         \t}\n"
    ));
}

#[test]
fn test_repeat_unsupported_on_glsl_es() {
    let mut graph = Graph::default();
    let repeat = graph.add_node(Node::new(NodeKind::Repeat));
    let abs = graph.add_node(Node::new(NodeKind::Abs));
    let limit = scalar(&mut graph, 8.0);
    let step = graph.add_node(Node::new(NodeKind::Step));
    let output = pixel_output(&mut graph);
    connect(&mut graph, repeat, "N", abs, "Input");
    connect(&mut graph, abs, "Output", repeat, "Input");
    connect(&mut graph, repeat, "N", step, "X");
    connect(&mut graph, limit, "Output", step, "Y");
    connect(&mut graph, step, "Output", repeat, "Condition");
    connect(&mut graph, repeat, "Output", output, "Input");

    let err = compiler(Backend::GlslEs).compile(&graph).unwrap_err();
    assert!(matches!(
        err,
        CompileError::Unsupported {
            backend: Backend::GlslEs,
            ..
        }
    ));
    assert!(compiler(Backend::Glsl).compile(&graph).is_ok());
}

fn interpolated_graph() -> Graph {
    let mut graph = Graph::new("Interpolated");
    let position = graph.add_node(Node::new(NodeKind::VertexInput {
        name: "Position".to_string(),
        usage: DataUsage::Position,
        ty: ValueType::Vec3,
        index: 0,
    }));
    let vertex_output = graph.add_node(Node::new(NodeKind::VertexOutput));
    let uv = graph.add_node(Node::new(NodeKind::VertexInput {
        name: "Uv".to_string(),
        usage: DataUsage::Custom,
        ty: ValueType::Vec2,
        index: 0,
    }));
    let interpolator = graph.add_node(Node::new(NodeKind::Interpolator));
    let output = pixel_output(&mut graph);
    connect(&mut graph, position, "Output", vertex_output, "Input");
    connect(&mut graph, uv, "Output", interpolator, "Input");
    connect(&mut graph, interpolator, "Output", output, "Input");
    connect(&mut graph, interpolator, "Output", output, "Input1");
    graph
}

#[test]
fn test_interpolator_crosses_stages() {
    let settings = CompilerSettings {
        emit_comments: false,
        ..CompilerSettings::default()
    };
    let artifact = ShaderCompiler::new(settings)
        .compile(&interpolated_graph())
        .unwrap();

    assert_eq!(artifact.interpolator_count, 1);
    assert_eq!(
        artifact.vertex_source,
        "#version 330\n\
         \n\
         in vec2 in_Custom0;\n\
         in vec3 in_Position0;\n\
         \n\
         out vec2 Attr0;\n\
         \n\
         void main()\n\
         {\n\
         \tAttr0 = in_Custom0;\n\
         \tvec4 v0 = vec4(in_Position0, 1.0);\n\
         \tgl_Position = v0;\n\
         }\n"
    );
    assert!(artifact.pixel_source.contains("in vec2 Attr0;\n"));
    assert!(artifact
        .pixel_source
        .contains("\t_gl_FragData_0 = vec4(Attr0, 0.0, 0.0);\n\t_gl_FragData_1 = vec4(Attr0, 0.0, 0.0);\n"));
}

#[test]
fn test_interpolator_hlsl_structs() {
    let artifact = compiler(Backend::Hlsl).compile(&interpolated_graph()).unwrap();

    assert!(artifact.vertex_source.contains(
        "struct VertexOutput\n{\n\tfloat4 Position : SV_Position;\n\tfloat2 Attr0 : TEXCOORD0;\n};\n"
    ));
    assert!(artifact.vertex_source.contains("\to.Attr0 = i.Custom0;\n"));
    assert!(artifact.pixel_source.contains(
        "struct PixelInput\n{\n\tfloat4 Position : SV_Position;\n\tfloat2 Attr0 : TEXCOORD0;\n};\n"
    ));
    assert!(artifact
        .pixel_source
        .contains("\to.Color0 = float4(i.Attr0, 0.0, 0.0);\n"));
}

#[test]
fn test_interpolator_slots_are_monotonic() {
    let mut graph = Graph::default();
    let a = uniform(&mut graph, "A", ValueType::Vec4);
    let b = uniform(&mut graph, "B", ValueType::Vec4);
    let first = graph.add_node(Node::new(NodeKind::Interpolator));
    let second = graph.add_node(Node::new(NodeKind::Interpolator));
    let add = graph.add_node(Node::new(NodeKind::Add));
    let output = pixel_output(&mut graph);
    connect(&mut graph, a, "Output", first, "Input");
    connect(&mut graph, b, "Output", second, "Input");
    connect(&mut graph, first, "Output", add, "Input1");
    connect(&mut graph, second, "Output", add, "Input2");
    connect(&mut graph, add, "Output", output, "Input");

    let artifact = compiler(Backend::Glsl).compile(&graph).unwrap();
    assert_eq!(artifact.interpolator_count, 2);
    assert!(artifact.pixel_source.contains("\tvec4 v0 = Attr0 + Attr1;\n"));
    let uniform = artifact.uniform("A").unwrap();
    assert_eq!(uniform.stages, vec![ordoplay_shader_compiler::ShaderStage::Vertex]);
}

#[test]
fn test_unknown_node_kind() {
    let mut graph = Graph::default();
    let mut external = Node::new(NodeKind::External {
        type_name: "Voronoi".to_string(),
    });
    external.outputs.push(Port::output("Output"));
    let external = graph.add_node(external);
    let output = pixel_output(&mut graph);
    connect(&mut graph, external, "Output", output, "Input");

    let err = compiler(Backend::Glsl).compile(&graph).unwrap_err();
    assert!(matches!(err, CompileError::UnknownNodeKind { .. }));
    assert_eq!(err.node().unwrap().kind, "Voronoi");
}

#[test]
fn test_missing_input() {
    let mut graph = Graph::default();
    let one = scalar(&mut graph, 1.0);
    let add = graph.add_node(Node::new(NodeKind::Add));
    let output = pixel_output(&mut graph);
    connect(&mut graph, one, "Output", add, "Input1");
    connect(&mut graph, add, "Output", output, "Input");

    let err = compiler(Backend::Glsl).compile(&graph).unwrap_err();
    assert!(matches!(err, CompileError::MissingInput { ref pin, .. } if pin == "Input2"));
    assert_eq!(err.node().unwrap().kind, "Add");
    assert!(err.to_string().ends_with("input 'Input2' is not connected"));
}

#[test]
fn test_missing_terminal() {
    let mut graph = Graph::default();
    uniform(&mut graph, "Color", ValueType::Vec4);
    assert!(matches!(
        compiler(Backend::Glsl).compile(&graph),
        Err(CompileError::MissingTerminal)
    ));
}

#[test]
fn test_matrix_and_vector_do_not_mix() {
    let mut graph = Graph::default();
    let matrix = uniform(&mut graph, "World", ValueType::Matrix4);
    let vector = uniform(&mut graph, "Offset", ValueType::Vec3);
    let add = graph.add_node(Node::new(NodeKind::Add));
    let output = pixel_output(&mut graph);
    connect(&mut graph, matrix, "Output", add, "Input1");
    connect(&mut graph, vector, "Output", add, "Input2");
    connect(&mut graph, add, "Output", output, "Input");

    assert!(matches!(
        compiler(Backend::Glsl).compile(&graph),
        Err(CompileError::TypeMismatch { .. })
    ));
}

#[test]
fn test_pixel_only_node_in_vertex_stage() {
    let mut graph = Graph::default();
    let front_face = graph.add_node(Node::new(NodeKind::FrontFace));
    let vertex_output = graph.add_node(Node::new(NodeKind::VertexOutput));
    let color = uniform(&mut graph, "Color", ValueType::Vec4);
    let output = pixel_output(&mut graph);
    connect(&mut graph, front_face, "Output", vertex_output, "Input");
    connect(&mut graph, color, "Output", output, "Input");

    let err = compiler(Backend::Glsl).compile(&graph).unwrap_err();
    assert!(matches!(err, CompileError::StageViolation { .. }));
    assert_eq!(err.node().unwrap().kind, "FrontFace");
}

#[test]
fn test_concurrent_compiles_share_nothing() {
    let graph = interpolated_graph();
    let compiler = compiler(Backend::Glsl);
    let expected = compiler.compile(&graph).unwrap();

    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| scope.spawn(|| compiler.compile(&graph).unwrap()))
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), expected);
        }
    });
}
