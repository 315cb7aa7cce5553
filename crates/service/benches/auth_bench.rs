use criterion::{criterion_group, criterion_main, Criterion};
use std::sync::Arc;

use service::auth::{AuthService, AuthSettings};
use service::auth::domain::{LoginInput, RegisterInput};
use service::auth::mailer::mock::RecordingMailer;
use service::auth::repository::mock::MockAuthRepository;
use service::auth::service::hash_password;

fn bench_login(c: &mut Criterion) {
    let repo = Arc::new(MockAuthRepository::default());
    let svc = AuthService::new(repo, Arc::new(RecordingMailer::default()), AuthSettings::with_secret("secret"));

    // pre-create user outside of the benchmark using a tokio runtime
    let rt = tokio::runtime::Runtime::new().unwrap();
    let _ = rt.block_on(svc.register(RegisterInput {
        email: "bench@example.com".into(),
        password: "Benchmark1".into(),
        first_name: "Bench".into(),
        last_name: "Mark".into(),
        role: None,
        team_id: None,
    }));

    c.bench_function("auth_login_verify", |b| {
        b.iter(|| {
            let _ = rt.block_on(svc.login(LoginInput { email: "bench@example.com".into(), password: "Benchmark1".into() })).unwrap();
        });
    });

    c.bench_function("argon2_hash", |b| b.iter(|| hash_password("Benchmark1").unwrap()));
}

criterion_group!(benches, bench_login);
criterion_main!(benches);
