//! End-to-end upload flows against the in-memory asset store.

use std::num::NonZeroUsize;
use std::sync::Arc;

use au_app::usecases::{KeyTarget, PublishAssetUseCase, UploadAssetUseCase};
use au_core::checksum::ChecksumPolicy;
use au_core::chunk::ChunkSize;
use au_core::config::UploadSettings;
use au_core::url::DeploymentContext;
use au_core::{AssetFile, CallerIdentity, ContentKey};
use au_infra::{InMemoryAssetStore, SystemClock};

fn patterned_bytes(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 251) as u8).collect()
}

fn settings(chunk_size: usize, concurrency: usize) -> UploadSettings {
    UploadSettings {
        chunk_size: ChunkSize::new(chunk_size).unwrap(),
        max_concurrent_chunks: NonZeroUsize::new(concurrency).unwrap(),
        checksum: ChecksumPolicy::Sha256,
        cleanup_on_failure: false,
    }
}

#[tokio::test]
async fn uploaded_bytes_are_readable_under_the_key() {
    let store = Arc::new(InMemoryAssetStore::new());
    let usecase = UploadAssetUseCase::new(store.clone(), settings(1000, 1));
    let bytes = patterned_bytes(2_500);
    let file = AssetFile::new("notes.pdf", Some("application/pdf".to_string()), bytes.clone());
    let key = ContentKey::new("/notes/aaaaa-aa/1/notes.pdf");

    let returned = usecase
        .execute(&CallerIdentity::anonymous(), &file, key.clone())
        .await
        .unwrap();

    assert_eq!(returned, key);
    let asset = store.get_asset(&key).unwrap();
    assert_eq!(asset.content.as_ref(), bytes.as_slice());
    assert_eq!(asset.content_type, "application/pdf");
    assert_eq!(store.open_batch_count(), 0);
}

#[tokio::test]
async fn concurrent_chunk_uploads_reassemble_in_order() {
    let store = Arc::new(InMemoryAssetStore::new());
    let usecase = UploadAssetUseCase::new(store.clone(), settings(7, 8));
    let bytes = patterned_bytes(1_000);
    let file = AssetFile::new("data.bin", None, bytes.clone());
    let key = ContentKey::new("data.bin");

    usecase
        .execute(&CallerIdentity::anonymous(), &file, key.clone())
        .await
        .unwrap();

    let asset = store.get_asset(&key).unwrap();
    assert_eq!(asset.content.as_ref(), bytes.as_slice());
    assert_eq!(asset.content_type, "application/octet-stream");
}

#[tokio::test]
async fn empty_file_becomes_empty_asset() {
    let store = Arc::new(InMemoryAssetStore::new());
    let usecase = UploadAssetUseCase::new(store.clone(), UploadSettings::default());
    let key = ContentKey::new("empty");

    usecase
        .execute(
            &CallerIdentity::anonymous(),
            &AssetFile::new("empty", None, Vec::new()),
            key.clone(),
        )
        .await
        .unwrap();

    assert!(store.get_asset(&key).unwrap().content.is_empty());
}

#[tokio::test]
async fn concurrent_uploads_of_different_files_are_independent() {
    let store = Arc::new(InMemoryAssetStore::new());
    let usecase = Arc::new(UploadAssetUseCase::new(store.clone(), settings(64, 2)));
    let identity = CallerIdentity::new("aaaaa-aa", Some("token".to_string()));

    let mut handles = Vec::new();
    for n in 0..4usize {
        let usecase = usecase.clone();
        let identity = identity.clone();
        handles.push(tokio::spawn(async move {
            let bytes = vec![n as u8; 300 + n * 17];
            let key = ContentKey::new(format!("file-{n}"));
            let file = AssetFile::new(format!("file-{n}"), None, bytes);
            usecase.execute(&identity, &file, key).await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    for n in 0..4usize {
        let asset = store.get_asset(&ContentKey::new(format!("file-{n}"))).unwrap();
        assert_eq!(asset.content.len(), 300 + n * 17);
        assert!(asset.content.iter().all(|b| *b == n as u8));
    }
}

#[tokio::test]
async fn publish_returns_local_url_for_namespaced_key() {
    let store = Arc::new(InMemoryAssetStore::new());
    let usecase = PublishAssetUseCase::new(
        UploadAssetUseCase::new(store.clone(), UploadSettings::default()),
        Arc::new(SystemClock),
        DeploymentContext::Local {
            host: "localhost:4943".to_string(),
            store_id: "store-cai".to_string(),
        },
    );

    let published = usecase
        .execute(
            &CallerIdentity::new("aaaaa-aa", None),
            &AssetFile::new("cv.pdf", None, vec![1u8; 10]),
            KeyTarget::Namespaced {
                purpose: "resumes".to_string(),
            },
        )
        .await
        .unwrap();

    assert!(published.key.as_str().starts_with("/resumes/aaaaa-aa/"));
    assert!(published
        .url
        .starts_with("http://localhost:4943/?canisterId=store-cai&asset=%2Fresumes%2Faaaaa-aa%2F"));
    assert!(store.get_asset(&published.key).is_some());
}

#[tokio::test]
async fn failed_commit_with_cleanup_leaves_no_open_batch() {
    let store = Arc::new(InMemoryAssetStore::new());

    // An asset with another content type makes the create operation fail.
    let key = ContentKey::new("taken");
    let seed = UploadAssetUseCase::new(store.clone(), UploadSettings::default());
    seed.execute(
        &CallerIdentity::anonymous(),
        &AssetFile::new("taken", Some("text/plain".to_string()), b"v1".to_vec()),
        key.clone(),
    )
    .await
    .unwrap();

    let usecase = UploadAssetUseCase::new(
        store.clone(),
        UploadSettings {
            cleanup_on_failure: true,
            ..UploadSettings::default()
        },
    );
    let err = usecase
        .execute(
            &CallerIdentity::anonymous(),
            &AssetFile::new("taken", Some("image/png".to_string()), b"v2".to_vec()),
            key.clone(),
        )
        .await
        .unwrap_err();

    assert!(err.to_string().contains("already exists"), "{err}");
    assert_eq!(store.open_batch_count(), 0);
    assert_eq!(store.get_asset(&key).unwrap().content.as_ref(), b"v1");

    // Without cleanup the failed batch stays open on the store.
    let leaky = UploadAssetUseCase::new(store.clone(), UploadSettings::default());
    leaky
        .execute(
            &CallerIdentity::anonymous(),
            &AssetFile::new("taken", Some("image/png".to_string()), b"v3".to_vec()),
            key,
        )
        .await
        .unwrap_err();
    assert_eq!(store.open_batch_count(), 1);
}
