use command_graph::{arg, list_arg, serial_nodes, Data, Input, RecordingOutput};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn build_graph() -> std::rc::Rc<command_graph::Node> {
    serial_nodes(vec![
        Box::new(arg::<String>("name", "").build()),
        Box::new(list_arg::<Vec<i64>>("counts", "", 1, 4).build()),
    ])
}

fn execute_benchmark(c: &mut Criterion) {
    c.bench_function("execute five-token graph", |b| {
        b.iter(|| {
            let root = build_graph();
            let mut input = Input::new(["alice", "1", "2", "3", "4"]);
            let mut data = Data::new();
            let mut output = RecordingOutput::default();
            command_graph::walker::execute(root, black_box(&mut input), &mut output, &mut data).unwrap();
        });
    });
}

fn complete_benchmark(c: &mut Criterion) {
    c.bench_function("complete mid-traversal", |b| {
        b.iter(|| {
            let root = build_graph();
            let mut input = Input::new(["alice", "1", "2"]);
            let mut data = Data::new();
            command_graph::walker::complete(root, black_box(&mut input), &mut data).unwrap();
        });
    });
}

criterion_group!(benches, execute_benchmark, complete_benchmark);
criterion_main!(benches);
