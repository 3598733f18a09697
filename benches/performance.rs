use ccg::core::{AnalyzerConfig, CodebaseAnalyzer, GraphBuilder, SourceFile};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use tempfile::TempDir;

fn write_fixture(dir: &TempDir, count: usize) -> Vec<SourceFile> {
    let mut files = Vec::with_capacity(count * 2);

    for i in 0..count {
        let content = format!(
            r#"
class TestClass{i}(BaseModel):
    """Fixture class {i}."""
    limit = 10

    def __init__(self):
        self.value = {i}

    def process(self):
        if self.value > 5 and self.value < 100:
            return self.calculate() * 2
        return helper(self.value)

    def calculate(self):
        total = 0
        for step in range(self.value):
            try:
                total += step
            except ValueError:
                pass
        return total

def helper(value):
    return value + 10

def main():
    instance = TestClass{i}()
    return instance.process()
"#
        );
        let path = dir.path().join(format!("test_{i}.py"));
        std::fs::write(&path, content).unwrap();
        files.push(SourceFile::new(path, "python"));

        let jac = format!(
            r#"
node Item{i} {{
    has name: str;
    has weight: int;
}}

edge Holds{i};

walker Collector{i} {{
    has total: int;
    can collect with Item{i} entry;
    can report;
}}
"#
        );
        let path = dir.path().join(format!("flow_{i}.jac"));
        std::fs::write(&path, jac).unwrap();
        files.push(SourceFile::new(path, "jac"));
    }

    files
}

fn benchmark_analysis(c: &mut Criterion) {
    let mut group = c.benchmark_group("codebase_analysis");

    let small_dir = TempDir::new().unwrap();
    let small = write_fixture(&small_dir, 10);

    group.bench_function("small_codebase", |b| {
        let analyzer = CodebaseAnalyzer::new();
        b.iter(|| black_box(analyzer.analyze(black_box(&small))));
    });

    let large_dir = TempDir::new().unwrap();
    let large = write_fixture(&large_dir, 100);

    group.bench_function("large_codebase", |b| {
        let analyzer = CodebaseAnalyzer::new();
        b.iter(|| black_box(analyzer.analyze(black_box(&large))));
    });

    group.bench_function("large_codebase_parallel", |b| {
        let analyzer = CodebaseAnalyzer::with_config(AnalyzerConfig { parallel: true });
        b.iter(|| black_box(analyzer.analyze(black_box(&large))));
    });

    group.finish();
}

fn benchmark_graph_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("graph_build");

    let dir = TempDir::new().unwrap();
    let files = write_fixture(&dir, 100);
    let entities = CodebaseAnalyzer::new().analyze(&files).entities;

    group.bench_function("name_resolution", |b| {
        b.iter(|| black_box(GraphBuilder::from_entities(black_box(&entities))));
    });

    group.finish();
}

criterion_group!(benches, benchmark_analysis, benchmark_graph_build);
criterion_main!(benches);
