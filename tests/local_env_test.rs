// Changes the working directory, so everything runs in one test function.

use sprout_smoke::{load_local_environment, EnvStore, MemoryEnv, LOCAL_ENV_PATH};
use std::fs;

#[test]
fn test_local_environment_follows_working_directory() {
    let original_dir = std::env::current_dir().unwrap();

    // No secrets file: nothing changes
    let empty_dir = tempfile::tempdir().unwrap();
    std::env::set_current_dir(empty_dir.path()).unwrap();
    let mut env: MemoryEnv = [("GOOGLE_API_KEY", "from-shell")].into_iter().collect();
    let before = env.clone();

    let report = load_local_environment(&mut env);

    assert!(!report.found);
    assert!(report.is_noop());
    assert_eq!(env, before);

    // Secrets file at .env/sprout.env: applied without overriding
    let project_dir = tempfile::tempdir().unwrap();
    let secrets_path = project_dir.path().join(LOCAL_ENV_PATH);
    fs::create_dir_all(secrets_path.parent().unwrap()).unwrap();
    fs::write(
        &secrets_path,
        "GOOGLE_API_KEY=from-file\nOPENAI_API_KEY=sk-file\n",
    )
    .unwrap();
    std::env::set_current_dir(project_dir.path()).unwrap();

    let report = load_local_environment(&mut env);
    let again = load_local_environment(&mut env);

    std::env::set_current_dir(original_dir).unwrap();

    assert!(report.found);
    assert_eq!(report.applied, vec!["OPENAI_API_KEY".to_string()]);
    assert_eq!(report.preserved, vec!["GOOGLE_API_KEY".to_string()]);
    assert_eq!(env.get("GOOGLE_API_KEY").as_deref(), Some("from-shell"));
    assert_eq!(env.get("OPENAI_API_KEY").as_deref(), Some("sk-file"));
    assert!(again.is_noop());
}
