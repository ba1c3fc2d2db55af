mod common;

use engine::{Amount, Category, EngineError, ExpenditureFields, IncomeFields, WriteMode};
use uuid::Uuid;

use common::{engine_with_db, signup};

fn not_found() -> EngineError {
    EngineError::NotFound("Not found.".to_string())
}

fn field_errors(err: EngineError) -> engine::FieldErrors {
    match err {
        EngineError::Validation(errors) => errors,
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[tokio::test]
async fn income_round_trip() {
    let (engine, _db) = engine_with_db().await;
    let alice = signup(&engine, "alice").await;

    let created = engine
        .create_income(IncomeFields::new("Salary", "2500.00"), alice.id)
        .await
        .unwrap();
    assert_eq!(created.owner, alice.id);
    assert_eq!(created.name_of_revenue, "Salary");
    assert_eq!(created.amount, Amount::from_minor(250_000));
    assert_eq!(created.created_at, created.updated_at);

    let fetched = engine
        .income(&created.id.to_string(), alice.id)
        .await
        .unwrap();
    assert_eq!(fetched, created);
}

#[tokio::test]
async fn incomes_are_invisible_to_other_users() {
    let (engine, _db) = engine_with_db().await;
    let alice = signup(&engine, "alice").await;
    let bob = signup(&engine, "bob").await;

    let income = engine
        .create_income(IncomeFields::new("Salary", "2500"), alice.id)
        .await
        .unwrap();
    let id = income.id.to_string();

    assert_eq!(engine.income(&id, bob.id).await, Err(not_found()));
    assert_eq!(
        engine.income(&Uuid::new_v4().to_string(), bob.id).await,
        Err(not_found())
    );
    assert_eq!(
        engine
            .update_income(
                &id,
                IncomeFields::default().amount("1"),
                WriteMode::Partial,
                bob.id
            )
            .await,
        Err(not_found())
    );
    assert_eq!(engine.delete_income(&id, bob.id).await, Err(not_found()));
    assert!(engine.incomes(bob.id).await.unwrap().is_empty());

    // Still there for its owner.
    assert_eq!(engine.income(&id, alice.id).await.unwrap(), income);
}

#[tokio::test]
async fn income_lists_are_scoped_and_ordered() {
    let (engine, _db) = engine_with_db().await;
    let alice = signup(&engine, "alice").await;
    let bob = signup(&engine, "bob").await;

    let first = engine
        .create_income(IncomeFields::new("Salary", "2500"), alice.id)
        .await
        .unwrap();
    engine
        .create_income(IncomeFields::new("Bonus", "10"), bob.id)
        .await
        .unwrap();
    let second = engine
        .create_income(IncomeFields::new("Freelance", "300.50"), alice.id)
        .await
        .unwrap();

    let listed = engine.incomes(alice.id).await.unwrap();
    assert_eq!(listed, vec![first, second]);
}

#[tokio::test]
async fn income_validation() {
    let (engine, _db) = engine_with_db().await;
    let alice = signup(&engine, "alice").await;

    let errors = field_errors(
        engine
            .create_income(IncomeFields::new("  ", "0.50"), alice.id)
            .await
            .unwrap_err(),
    );
    assert_eq!(errors.get("name_of_revenue"), ["This field may not be blank."]);
    assert_eq!(
        errors.get("amount"),
        ["Ensure this value is greater than or equal to 1."]
    );

    let errors = field_errors(
        engine
            .create_income(IncomeFields::default(), alice.id)
            .await
            .unwrap_err(),
    );
    assert_eq!(errors.get("name_of_revenue"), ["This field is required."]);
    assert_eq!(errors.get("amount"), ["This field is required."]);

    let errors = field_errors(
        engine
            .create_income(IncomeFields::new("Salary", "-10"), alice.id)
            .await
            .unwrap_err(),
    );
    assert!(errors.contains("amount"));
    assert!(engine.incomes(alice.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn income_partial_update_keeps_other_fields() {
    let (engine, _db) = engine_with_db().await;
    let alice = signup(&engine, "alice").await;
    let income = engine
        .create_income(IncomeFields::new("Salary", "2500"), alice.id)
        .await
        .unwrap();
    let id = income.id.to_string();

    let updated = engine
        .update_income(
            &id,
            IncomeFields::default().amount("3000"),
            WriteMode::Partial,
            alice.id,
        )
        .await
        .unwrap();
    assert_eq!(updated.name_of_revenue, "Salary");
    assert_eq!(updated.amount, Amount::from_minor(300_000));
    assert_eq!(updated.created_at, income.created_at);
    assert!(updated.updated_at >= income.updated_at);

    let errors = field_errors(
        engine
            .update_income(
                &id,
                IncomeFields::default().amount("3000"),
                WriteMode::Full,
                alice.id,
            )
            .await
            .unwrap_err(),
    );
    assert_eq!(errors.get("name_of_revenue"), ["This field is required."]);
}

#[tokio::test]
async fn income_delete_is_permanent() {
    let (engine, _db) = engine_with_db().await;
    let alice = signup(&engine, "alice").await;
    let income = engine
        .create_income(IncomeFields::new("Salary", "2500"), alice.id)
        .await
        .unwrap();
    let id = income.id.to_string();

    engine.delete_income(&id, alice.id).await.unwrap();
    assert_eq!(engine.income(&id, alice.id).await, Err(not_found()));
    assert_eq!(engine.delete_income(&id, alice.id).await, Err(not_found()));
}

#[tokio::test]
async fn malformed_ids_behave_like_missing_ones() {
    let (engine, _db) = engine_with_db().await;
    let alice = signup(&engine, "alice").await;

    assert_eq!(engine.income("nope", alice.id).await, Err(not_found()));
    assert_eq!(
        engine.delete_expenditure("nope", alice.id).await,
        Err(not_found())
    );
}

#[tokio::test]
async fn expenditure_category_defaults_and_validates() {
    let (engine, _db) = engine_with_db().await;
    let alice = signup(&engine, "alice").await;

    let defaulted = engine
        .create_expenditure(ExpenditureFields::new("Groceries", "45.20"), alice.id)
        .await
        .unwrap();
    assert_eq!(defaulted.category, Category::Other);

    let food = engine
        .create_expenditure(
            ExpenditureFields::new("Groceries", "45.20").category("FOOD"),
            alice.id,
        )
        .await
        .unwrap();
    assert_eq!(food.category, Category::Food);

    let errors = field_errors(
        engine
            .create_expenditure(
                ExpenditureFields::new("Yacht", "100").category("LUXURY"),
                alice.id,
            )
            .await
            .unwrap_err(),
    );
    assert_eq!(errors.get("category"), ["\"LUXURY\" is not a valid choice."]);
}

#[tokio::test]
async fn expenditure_amount_limits() {
    let (engine, _db) = engine_with_db().await;
    let alice = signup(&engine, "alice").await;

    assert!(
        engine
            .create_expenditure(ExpenditureFields::new("Laptop", "9999.99"), alice.id)
            .await
            .is_ok()
    );
    let errors = field_errors(
        engine
            .create_expenditure(ExpenditureFields::new("Car", "12345.67"), alice.id)
            .await
            .unwrap_err(),
    );
    assert_eq!(
        errors.get("amount"),
        ["Ensure that there are no more than 6 digits in total."]
    );
}

#[tokio::test]
async fn expenditure_full_update_requires_category() {
    let (engine, _db) = engine_with_db().await;
    let alice = signup(&engine, "alice").await;
    let bob = signup(&engine, "bob").await;
    let expenditure = engine
        .create_expenditure(
            ExpenditureFields::new("Bus pass", "30").category("TRANSPORT"),
            alice.id,
        )
        .await
        .unwrap();
    let id = expenditure.id.to_string();

    let errors = field_errors(
        engine
            .update_expenditure(
                &id,
                ExpenditureFields::new("Bus pass", "35"),
                WriteMode::Full,
                alice.id,
            )
            .await
            .unwrap_err(),
    );
    assert_eq!(errors.get("category"), ["This field is required."]);

    let updated = engine
        .update_expenditure(
            &id,
            ExpenditureFields::default().name_of_item("Metro pass"),
            WriteMode::Partial,
            alice.id,
        )
        .await
        .unwrap();
    assert_eq!(updated.category, Category::Transport);
    assert_eq!(updated.name_of_item, "Metro pass");
    assert_eq!(updated.amount, expenditure.amount);

    assert_eq!(
        engine.expenditure(&id, bob.id).await,
        Err(not_found())
    );
    assert!(engine.expenditures(bob.id).await.unwrap().is_empty());
    assert_eq!(engine.expenditures(alice.id).await.unwrap(), vec![updated]);
}

#[tokio::test]
async fn expenditures_are_invisible_to_other_users() {
    let (engine, _db) = engine_with_db().await;
    let alice = signup(&engine, "alice").await;
    let bob = signup(&engine, "bob").await;

    let expenditure = engine
        .create_expenditure(
            ExpenditureFields::new("Rent", "900").category("RENT"),
            alice.id,
        )
        .await
        .unwrap();
    let id = expenditure.id.to_string();

    assert_eq!(engine.expenditure(&id, bob.id).await, Err(not_found()));
    assert_eq!(
        engine
            .update_expenditure(
                &id,
                ExpenditureFields::new("Rent", "1").category("OTHER"),
                WriteMode::Full,
                bob.id
            )
            .await,
        Err(not_found())
    );
    assert_eq!(
        engine
            .update_expenditure(
                &id,
                ExpenditureFields::default().amount("1"),
                WriteMode::Partial,
                bob.id
            )
            .await,
        Err(not_found())
    );
    assert_eq!(
        engine.delete_expenditure(&id, bob.id).await,
        Err(not_found())
    );

    assert_eq!(
        engine.expenditure(&id, alice.id).await.unwrap(),
        expenditure
    );
}

#[tokio::test]
async fn expenditure_amount_must_be_at_least_one() {
    let (engine, _db) = engine_with_db().await;
    let alice = signup(&engine, "alice").await;

    for raw in ["0", "-5", "0.99"] {
        let errors = field_errors(
            engine
                .create_expenditure(ExpenditureFields::new("Gum", raw), alice.id)
                .await
                .unwrap_err(),
        );
        assert_eq!(
            errors.get("amount"),
            ["Ensure this value is greater than or equal to 1."],
            "{raw:?}"
        );
    }
    assert!(engine.expenditures(alice.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn expenditure_category_must_match_exactly() {
    let (engine, _db) = engine_with_db().await;
    let alice = signup(&engine, "alice").await;

    let errors = field_errors(
        engine
            .create_expenditure(
                ExpenditureFields::new("Groceries", "12").category(" FOOD "),
                alice.id,
            )
            .await
            .unwrap_err(),
    );
    assert_eq!(errors.get("category"), ["\" FOOD \" is not a valid choice."]);
}

#[tokio::test]
async fn comma_amounts_are_not_numbers() {
    let (engine, _db) = engine_with_db().await;
    let alice = signup(&engine, "alice").await;

    for raw in ["12,50", "2,500"] {
        let errors = field_errors(
            engine
                .create_income(IncomeFields::new("Tip", raw), alice.id)
                .await
                .unwrap_err(),
        );
        assert_eq!(errors.get("amount"), ["A valid number is required."], "{raw:?}");
    }
}
