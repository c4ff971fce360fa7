//! Benchmarks for proxy generation and intercepted dispatch.
//!
//! Measures the three costs callers see:
//! - First-time generation of a proxy class (cache miss)
//! - Repeated type requests (cache hit)
//! - Intercepted calls through an existing proxy

extern crate proxyscope;

use criterion::{criterion_group, criterion_main, Criterion};
use proxyscope::prelude::*;
use std::hint::black_box;
use std::sync::Arc;

struct Adder {
    token: Token,
}

impl Dispatch for Adder {
    fn type_token(&self) -> Token {
        self.token
    }

    fn invoke(
        &self,
        _method: &MethodDesc,
        _generic_args: &[ValueType],
        args: &mut [Value],
    ) -> Result<Value> {
        Ok(Value::Int32(args[0].as_i32()? + args[1].as_i32()?))
    }
}

fn adder() -> DynObject {
    Arc::new(Adder {
        token: Token::alloc(TokenKind::TypeDesc),
    })
}

fn contract(model: &TypeModel, name: &str) -> TypeDescRc {
    TypeDesc::interface("bench", name)
        .method(
            MethodDesc::build("sum")
                .param("a", ValueType::Int32)
                .param("b", ValueType::Int32)
                .returns(ValueType::Int32),
        )
        .build(model)
        .unwrap()
}

/// Benchmark generating a fresh proxy class for a never-seen interface.
fn bench_generate_fresh_type(c: &mut Criterion) {
    let model = TypeModel::new();
    let options = ProxyGenerationOptions::default();

    let mut counter = 0u32;
    c.bench_function("proxygen_generate_fresh", |b| {
        b.iter(|| {
            counter += 1;
            let iface = contract(&model, &format!("IFresh{counter}"));
            let generator = ProxyGenerator::new(model.clone());
            let class = generator
                .create_interface_proxy_without_target_type(&iface, &[], &options)
                .unwrap();
            black_box(class)
        });
    });
}

/// Benchmark re-requesting an already-generated proxy class.
fn bench_cache_hit(c: &mut Criterion) {
    let model = TypeModel::new();
    let iface = contract(&model, "ICached");
    let generator = ProxyGenerator::new(model);
    let options = ProxyGenerationOptions::default();
    generator
        .create_interface_proxy_without_target_type(&iface, &[], &options)
        .unwrap();

    c.bench_function("proxygen_cache_hit", |b| {
        b.iter(|| {
            let class = generator
                .create_interface_proxy_without_target_type(black_box(&iface), &[], &options)
                .unwrap();
            black_box(class)
        });
    });
}

/// Benchmark an intercepted call through one pass-through interceptor.
fn bench_intercepted_call(c: &mut Criterion) {
    let model = TypeModel::new();
    let iface = contract(&model, "ICalls");
    let generator = ProxyGenerator::new(model);
    let proxy = generator
        .create_interface_proxy_with_target(
            &iface,
            &[],
            adder(),
            &ProxyGenerationOptions::default(),
            vec![Arc::new(StandardInterceptor)],
        )
        .unwrap();
    let sum = iface.method_by_name("sum").unwrap();

    c.bench_function("proxygen_intercepted_call", |b| {
        b.iter(|| {
            let mut args = [Value::Int32(black_box(20)), Value::Int32(black_box(25))];
            let result = proxy.invoke(&sum, &[], &mut args).unwrap();
            black_box(result)
        });
    });
}

/// Benchmark the same call with a five-deep interceptor chain.
fn bench_deep_chain_call(c: &mut Criterion) {
    let model = TypeModel::new();
    let iface = contract(&model, "IDeep");
    let generator = ProxyGenerator::new(model);
    let chain: Vec<InterceptorRc> = (0..5)
        .map(|_| Arc::new(StandardInterceptor) as InterceptorRc)
        .collect();
    let proxy = generator
        .create_interface_proxy_with_target(
            &iface,
            &[],
            adder(),
            &ProxyGenerationOptions::default(),
            chain,
        )
        .unwrap();
    let sum = iface.method_by_name("sum").unwrap();

    c.bench_function("proxygen_deep_chain_call", |b| {
        b.iter(|| {
            let mut args = [Value::Int32(1), Value::Int32(2)];
            let result = proxy.invoke(&sum, &[], &mut args).unwrap();
            black_box(result)
        });
    });
}

/// Benchmark direct dispatch to the target, as the no-proxy baseline.
fn bench_direct_call_baseline(c: &mut Criterion) {
    let model = TypeModel::new();
    let iface = contract(&model, "IDirect");
    let target = adder();
    let sum = iface.method_by_name("sum").unwrap();

    c.bench_function("proxygen_direct_baseline", |b| {
        b.iter(|| {
            let mut args = [Value::Int32(20), Value::Int32(25)];
            let result = target.invoke(&sum, &[], &mut args).unwrap();
            black_box(result)
        });
    });
}

criterion_group!(
    benches,
    bench_generate_fresh_type,
    bench_cache_hit,
    bench_intercepted_call,
    bench_deep_chain_call,
    bench_direct_call_baseline
);
criterion_main!(benches);
