pub mod choice;
pub mod controller;
pub mod expression;
pub mod ids;
pub mod mapper;
pub mod model;
pub mod resolver;
pub mod schema;
pub mod state;
pub mod validation;

pub use choice::{AndChoice, Choice, DefaultChoice, NotChoice, Operator, OrChoice};
pub use controller::WorkflowController;
pub use expression::{ExpressionEvaluator, RhaiExpressionEvaluator};
pub use ids::generate_unique_id;
pub use mapper::{parse_tree, WorkflowMapper};
pub use model::{
    Action, ActionMode, Branch, Event, Filter, Function, Retry, TriggerEvent, Workflow,
};
pub use resolver::{InitContext, ValueResolver};
pub use schema::SchemaValidator;
pub use state::{
    DefaultState, DelayState, EndState, EndStatus, EventState, OperationState, ParallelState,
    State, StateType, SwitchState,
};
pub use validation::{
    render_validation_errors, ValidationError, ValidationErrorType, WorkflowRule,
    WorkflowValidator,
};
