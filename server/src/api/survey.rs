use crate::api::extract::{Form, Path};
use crate::api::{self, ApiError, ApiResult, middleware};
use crate::app::AppState;
use crate::auth::Client;
use crate::flash::{self, Category};
use crate::form::{FormErrors, FormView};
use crate::model::enums::ResourceType;
use crate::model::survey::{NewSurvey, NewSurveyOption, Survey};
use crate::resource::survey::SurveyInfo;
use crate::schema::{survey, survey_option};
use axum::extract::{Extension, State};
use axum::response::Response;
use axum::{Router, routing};
use axum_extra::extract::cookie::CookieJar;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use validator::Validate;

pub fn routes() -> Router<AppState> {
    let restricted = Router::new()
        .route("/survey/new", routing::get(new_survey_page).post(create))
        .route_layer(axum::middleware::from_fn(middleware::login_required));
    Router::new()
        .route("/surveys", routing::get(list))
        .route("/survey/{id}", routing::get(survey_page).post(vote))
        .merge(restricted)
}

#[derive(Default, Deserialize, Serialize, Validate)]
#[serde(default)]
struct SurveyForm {
    #[validate(custom(function = "crate::form::required"))]
    question: String,
    /// One option per line.
    #[validate(custom(function = "crate::form::required"))]
    options: String,
}

impl SurveyForm {
    fn option_lines(&self) -> Vec<&str> {
        self.options.split('\n').map(str::trim).filter(|line| !line.is_empty()).collect()
    }
}

async fn new_survey_page(Extension(client): Extension<Client>, jar: CookieJar) -> Response {
    let view = FormView::fresh(SurveyForm::default());
    api::render(jar, client, Some(String::from("New Survey")), view)
}

async fn create(
    State(state): State<AppState>,
    Extension(client): Extension<Client>,
    jar: CookieJar,
    Form(form): Form<SurveyForm>,
) -> ApiResult<Response> {
    // A non-blank options field always yields at least one line.
    let errors = FormErrors::validate(&form);
    let option_lines = form.option_lines();
    if !errors.is_empty() {
        return Ok(api::render(jar, client, Some(String::from("New Survey")), FormView::new(form, errors)));
    }

    let survey_id = state.get_connection()?.transaction(|conn| {
        let survey_id: i32 = diesel::insert_into(survey::table)
            .values(NewSurvey {
                question: &form.question,
            })
            .returning(survey::id)
            .get_result(conn)?;

        let new_options: Vec<_> = option_lines
            .iter()
            .map(|&option_text| NewSurveyOption { survey_id, option_text })
            .collect();
        diesel::insert_into(survey_option::table)
            .values(new_options)
            .execute(conn)?;
        QueryResult::Ok(survey_id)
    })?;
    tracing::info!("Created survey {survey_id} with {} options", option_lines.len());

    let jar = flash::push(jar, Category::Success, "Your survey has been created!");
    Ok(api::redirect(jar, "/home"))
}

#[derive(Serialize)]
struct SurveyList {
    surveys: Vec<SurveyInfo>,
}

async fn list(State(state): State<AppState>, Extension(client): Extension<Client>, jar: CookieJar) -> ApiResult<Response> {
    let surveys = SurveyInfo::all(&mut *state.get_connection()?)?;
    Ok(api::render(jar, client, Some(String::from("Surveys")), SurveyList { surveys }))
}

#[derive(Default, Deserialize)]
#[serde(default)]
struct VoteForm {
    /// Id of the chosen option. Radio groups submit nothing when left unselected.
    option: Option<String>,
}

#[derive(Serialize)]
struct VoteValues {
    option: Option<String>,
}

#[derive(Serialize)]
struct SurveyPage {
    survey: SurveyInfo,
    #[serde(flatten)]
    vote_form: FormView<VoteValues>,
}

fn get_survey(conn: &mut SqliteConnection, survey_id: i32) -> ApiResult<SurveyInfo> {
    let survey = survey::table
        .find(survey_id)
        .select(Survey::as_select())
        .first(conn)
        .optional()?
        .ok_or(ApiError::NotFound(ResourceType::Survey))?;
    SurveyInfo::new(conn, survey).map_err(ApiError::from)
}

async fn survey_page(
    State(state): State<AppState>,
    Extension(client): Extension<Client>,
    jar: CookieJar,
    Path(survey_id): Path<i32>,
) -> ApiResult<Response> {
    let survey = get_survey(&mut *state.get_connection()?, survey_id)?;
    let title = Some(survey.question.clone());
    let page = SurveyPage {
        survey,
        vote_form: FormView::fresh(VoteValues { option: None }),
    };
    Ok(api::render(jar, client, title, page))
}

async fn vote(
    State(state): State<AppState>,
    Extension(client): Extension<Client>,
    jar: CookieJar,
    Path(survey_id): Path<i32>,
    Form(form): Form<VoteForm>,
) -> ApiResult<Response> {
    let mut conn = state.get_connection()?;
    let survey = get_survey(&mut conn, survey_id)?;

    let mut errors = FormErrors::default();
    let selected = form.option.as_deref().map(str::trim).filter(|option| !option.is_empty());
    match selected.map(str::parse::<i32>) {
        None => errors.add("option", "This field is required."),
        Some(Ok(option_id)) if survey.has_option(option_id) => {
            count_vote(&mut conn, option_id)?;
            tracing::debug!("Counted vote for option {option_id} of survey {survey_id}");

            let jar = flash::push(jar, Category::Success, "Your vote has been counted!");
            return Ok(api::redirect(jar, &format!("/survey/{survey_id}")));
        }
        Some(_) => errors.add("option", "Not a valid choice."),
    }
    drop(conn);

    let title = Some(survey.question.clone());
    let page = SurveyPage {
        survey,
        vote_form: FormView::new(VoteValues { option: form.option }, errors),
    };
    Ok(api::render(jar, client, title, page))
}

/// Adds one vote to `option_id`.
///
/// The count is read and written back as two statements outside of a transaction,
/// so concurrent votes on the same option can overwrite each other's increment.
fn count_vote(conn: &mut SqliteConnection, option_id: i32) -> QueryResult<()> {
    let votes: i32 = survey_option::table
        .find(option_id)
        .select(survey_option::votes)
        .first(conn)?;
    diesel::update(survey_option::table.find(option_id))
        .set(survey_option::votes.eq(votes + 1))
        .execute(conn)?;
    Ok(())
}

#[cfg(test)]
mod test {
    use crate::model::survey::SurveyOption;
    use crate::schema::{survey, survey_option};
    use crate::test::*;
    use axum::http::StatusCode;
    use diesel::prelude::*;

    fn load_options(state: &crate::app::AppState, survey_id: i32) -> Vec<SurveyOption> {
        let mut conn = state.get_connection().unwrap();
        survey_option::table
            .filter(survey_option::survey_id.eq(survey_id))
            .select(SurveyOption::as_select())
            .order_by(survey_option::id)
            .load(&mut conn)
            .unwrap()
    }

    #[tokio::test]
    async fn create_survey() {
        let state = test_state(None);
        create_test_user(&state, TEST_USERNAME, TEST_EMAIL);
        let server = test_server(&state);
        log_in(&server).await;

        let response = server
            .post("/survey/new")
            .form(&[("question", "Favorite color?"), ("options", "Red\nBlue\nGreen")])
            .await;
        response.assert_status(StatusCode::SEE_OTHER);
        assert_eq!(response.header("location"), "/home");

        let mut conn = state.get_connection().unwrap();
        let survey_id: i32 = survey::table.select(survey::id).first(&mut conn).unwrap();
        drop(conn);

        let options = load_options(&state, survey_id);
        let texts: Vec<&str> = options.iter().map(|option| option.option_text.as_str()).collect();
        assert_eq!(texts, ["Red", "Blue", "Green"]);
        assert!(options.iter().all(|option| option.votes == 0));

        let page: serde_json::Value = server.get("/surveys").await.json();
        assert_eq!(page["surveys"][0]["question"], "Favorite color?");
        assert_eq!(page["surveys"][0]["options"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn blank_option_lines() {
        let state = test_state(None);
        create_test_user(&state, TEST_USERNAME, TEST_EMAIL);
        let server = test_server(&state);
        log_in(&server).await;

        server
            .post("/survey/new")
            .form(&[("question", "Pets?"), ("options", " Cat \r\n\n  \nDog\n")])
            .await
            .assert_status(StatusCode::SEE_OTHER);
        let mut conn = state.get_connection().unwrap();
        let survey_id: i32 = survey::table.select(survey::id).first(&mut conn).unwrap();
        drop(conn);

        let texts: Vec<String> = load_options(&state, survey_id)
            .into_iter()
            .map(|option| option.option_text)
            .collect();
        assert_eq!(texts, ["Cat", "Dog"]);

        let response = server
            .post("/survey/new")
            .form(&[("question", "Nothing?"), ("options", "\n \n")])
            .await;
        response.assert_status_ok();
        let page: serde_json::Value = response.json();
        assert_eq!(page["errors"]["options"], serde_json::json!(["This field is required."]));

        let response = server
            .post("/survey/new")
            .form(&[("question", "   "), ("options", "Yes\nNo")])
            .await;
        response.assert_status_ok();
        let page: serde_json::Value = response.json();
        assert_eq!(page["errors"]["question"], serde_json::json!(["This field is required."]));

        let mut conn = state.get_connection().unwrap();
        let survey_count: i64 = survey::table.count().get_result(&mut conn).unwrap();
        assert_eq!(survey_count, 1);
    }

    #[tokio::test]
    async fn vote() {
        let state = test_state(None);
        let survey_id = create_test_survey(&state, "Favorite color?", &["Red", "Blue"]);
        let options = load_options(&state, survey_id);
        let server = test_server(&state);

        let survey_url = format!("/survey/{survey_id}");
        let blue = options[1].id.to_string();
        let response = server.post(&survey_url).form(&[("option", blue.as_str())]).await;
        response.assert_status(StatusCode::SEE_OTHER);
        assert_eq!(response.header("location"), survey_url.as_str());

        let votes: Vec<i32> = load_options(&state, survey_id).iter().map(|option| option.votes).collect();
        assert_eq!(votes, [0, 1]);

        let page: serde_json::Value = server.get(&survey_url).await.json();
        assert_eq!(page["flashes"][0]["category"], "success");
        assert_eq!(page["flashes"][0]["message"], "Your vote has been counted!");
        assert_eq!(page["survey"]["options"][1]["votes"], 1);

        server.post(&survey_url).form(&[("option", blue.as_str())]).await;
        let votes: Vec<i32> = load_options(&state, survey_id).iter().map(|option| option.votes).collect();
        assert_eq!(votes, [0, 2]);
    }

    #[tokio::test]
    async fn invalid_vote() {
        let state = test_state(None);
        let survey_id = create_test_survey(&state, "Favorite color?", &["Red", "Blue"]);
        let other_survey_id = create_test_survey(&state, "Favorite animal?", &["Cat"]);
        let foreign_option = load_options(&state, other_survey_id)[0].id.to_string();
        let server = test_server(&state);

        let survey_url = format!("/survey/{survey_id}");
        let response = server.post(&survey_url).form(&[("option", "")]).await;
        response.assert_status_ok();
        let page: serde_json::Value = response.json();
        assert_eq!(page["errors"]["option"][0], "This field is required.");

        let response = server.post(&survey_url).form(&[("option", foreign_option.as_str())]).await;
        let page: serde_json::Value = response.json();
        assert_eq!(page["errors"]["option"][0], "Not a valid choice.");

        let response = server.post(&survey_url).form(&[("option", "red")]).await;
        let page: serde_json::Value = response.json();
        assert_eq!(page["errors"]["option"][0], "Not a valid choice.");

        let options = load_options(&state, survey_id).into_iter().chain(load_options(&state, other_survey_id));
        assert!(options.into_iter().all(|option| option.votes == 0));
    }

    #[tokio::test]
    async fn missing_survey() {
        let state = test_state(None);
        let server = test_server(&state);
        server.get("/survey/1").await.assert_status_not_found();
        server
            .post("/survey/1")
            .form(&[("option", "1")])
            .await
            .assert_status_not_found();
    }
}
