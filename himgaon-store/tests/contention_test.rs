mod common;

use common::{cart_of, contact, setup, setup_with};
use himgaon_catalog::{ProductDraft, ProductError};
use himgaon_core::repository::{OrderRepository, ProductRepository};
use himgaon_order::{OrderError, OrderStatus};

fn draft(name: &str, price_paise: i64, stock: i64) -> ProductDraft {
    ProductDraft {
        name_en: name.into(),
        name_hi: format!("{} (hi)", name),
        price_paise,
        description_en: None,
        description_hi: None,
        image_url: None,
        stock,
        category: None,
    }
}

#[tokio::test]
async fn test_busy_writer_lock_surfaces_transient() {
    let store = setup_with(|db| {
        db.busy_timeout_ms = 200;
        db.operation_timeout_ms = 5_000;
    })
    .await;
    let milk = store.add_product("Fresh Cow Milk", 6000, 50).await;
    let ghee = store.add_product("Pure Desi Ghee", 65000, 30).await;
    let pending = store
        .orders
        .place_order(contact(), &mut cart_of(&[(&ghee, 2)]))
        .await
        .unwrap();

    // Another connection takes the writer lock and keeps it
    let blocker = store.db.pool.begin_with("BEGIN IMMEDIATE").await.unwrap();

    let mut cart = cart_of(&[(&milk, 2)]);
    let before = cart.clone();
    let err = store.orders.place_order(contact(), &mut cart).await.unwrap_err();
    assert!(matches!(err, OrderError::Transient(_)), "got {:?}", err);
    assert_eq!(cart, before, "cart is kept for the retry");

    let err = store
        .orders
        .reject_order(&store.admin, pending.order_id, "")
        .await
        .unwrap_err();
    assert!(matches!(err, OrderError::Transient(_)), "got {:?}", err);

    let err = store
        .products
        .update_product(&store.admin, milk.id, draft("Fresh Cow Milk", 7000, 10))
        .await
        .unwrap_err();
    assert!(matches!(err, ProductError::Transient(_)), "got {:?}", err);

    blocker.rollback().await.unwrap();

    assert_eq!(store.stock_of(milk.id).await, 50);
    assert_eq!(store.stock_of(ghee.id).await, 28);
    assert_eq!(store.order_count().await, 1);
    let order = store
        .orders
        .get_order(&store.admin, pending.order_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(order.status, OrderStatus::Pending);
    let unchanged = store.products.get_product(milk.id).await.unwrap().unwrap();
    assert_eq!(unchanged.price_paise, 6000);

    // Once the lock is gone the same cart goes through
    store.orders.place_order(contact(), &mut cart).await.unwrap();
    assert!(cart.is_empty());
    assert_eq!(store.stock_of(milk.id).await, 48);
}

#[tokio::test]
async fn test_operation_timeout_surfaces_transient() {
    let store = setup_with(|db| {
        db.busy_timeout_ms = 5_000;
        db.operation_timeout_ms = 300;
    })
    .await;
    let butter = store.add_product("Mountain Butter", 20000, 35).await;

    let blocker = store.db.pool.begin_with("BEGIN IMMEDIATE").await.unwrap();

    let mut cart = cart_of(&[(&butter, 3)]);
    let err = store.orders.place_order(contact(), &mut cart).await.unwrap_err();
    assert!(matches!(err, OrderError::Transient(_)), "got {:?}", err);
    assert!(!cart.is_empty());

    let err = store
        .products
        .create_product(&store.admin, draft("Buttermilk", 3000, 60))
        .await
        .unwrap_err();
    assert!(matches!(err, ProductError::Transient(_)), "got {:?}", err);

    blocker.rollback().await.unwrap();

    // WAL readers are never blocked, so these see the committed state
    assert_eq!(store.stock_of(butter.id).await, 35);
    assert_eq!(store.order_count().await, 0);
    assert_eq!(store.products.list_products().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_default_settings_wait_out_a_short_lock() {
    let store = setup().await;
    let eggs = store.add_product("Free Range Eggs", 8000, 100).await;

    let blocker = store.db.pool.begin_with("BEGIN IMMEDIATE").await.unwrap();
    let release = tokio::spawn(async move {
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        blocker.commit().await.unwrap();
    });

    let placed = store
        .orders
        .place_order(contact(), &mut cart_of(&[(&eggs, 6)]))
        .await
        .unwrap();
    release.await.unwrap();

    assert_eq!(placed.total_paise, 48000);
    assert_eq!(store.stock_of(eggs.id).await, 94);
}
