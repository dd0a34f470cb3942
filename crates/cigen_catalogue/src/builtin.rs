//! The builtin fragment catalogue.
//!
//! Literal commands for each language/package-manager/provider/service live
//! here as data. Compatibility between values is expressed only through
//! `requires`/`excludes`, so adding a value never needs new resolver logic.

use crate::catalogue::FragmentCatalogue;
use crate::fragment::{Axis, Fragment, Step};

use crate::fragment::StageName::{Build, Deploy, Lint, PostDeploy, PreBuild, PreDeploy, Test};

impl FragmentCatalogue {
    /// The catalogue shipped with cigen.
    pub fn builtin() -> Self {
        let mut catalogue = FragmentCatalogue::new();
        for fragment in languages()
            .into_iter()
            .chain(package_managers())
            .chain(frameworks())
            .chain(providers())
            .chain(services())
            .chain(hooks())
        {
            catalogue.register(fragment);
        }
        catalogue
    }
}

fn languages() -> Vec<Fragment> {
    vec![
        Fragment::new(Axis::Language, "nodejs", "Node.js")
            .env("NODE_VERSION", "20")
            .setup(
                Step::uses("Setup Node.js", "actions/setup-node@v4")
                    .with_input("node-version", "${{ env.NODE_VERSION }}"),
            ),
        Fragment::new(Axis::Language, "python", "Python")
            .env("PYTHON_VERSION", "3.12")
            .setup(
                Step::uses("Setup Python", "actions/setup-python@v5")
                    .with_input("python-version", "${{ env.PYTHON_VERSION }}"),
            ),
        Fragment::new(Axis::Language, "go", "Go")
            .env("GO_VERSION", "1.22")
            .setup(
                Step::uses("Setup Go", "actions/setup-go@v5")
                    .with_input("go-version", "${{ env.GO_VERSION }}"),
            ),
        Fragment::new(Axis::Language, "java", "Java")
            .env("JAVA_VERSION", "21")
            .setup(
                Step::uses("Setup Java", "actions/setup-java@v4")
                    .with_input("distribution", "temurin")
                    .with_input("java-version", "${{ env.JAVA_VERSION }}"),
            ),
        Fragment::new(Axis::Language, "ruby", "Ruby")
            .env("RUBY_VERSION", "3.3")
            .setup(
                Step::uses("Setup Ruby", "ruby/setup-ruby@v1")
                    .with_input("ruby-version", "${{ env.RUBY_VERSION }}"),
            ),
    ]
}

fn package_managers() -> Vec<Fragment> {
    vec![
        Fragment::new(Axis::PackageManager, "npm", "npm")
            .requires(Axis::Language, &["nodejs"])
            .setup(Step::run("Install dependencies", "npm ci"))
            .step(Lint, Step::run("Lint", "npm run lint"))
            .step(Test, Step::run("Test", "npm test"))
            .step(Build, Step::run("Build", "npm run build")),
        Fragment::new(Axis::PackageManager, "yarn", "Yarn")
            .requires(Axis::Language, &["nodejs"])
            .setup(Step::run("Enable Corepack", "corepack enable"))
            .setup(Step::run("Install dependencies", "yarn install --immutable"))
            .step(Lint, Step::run("Lint", "yarn lint"))
            .step(Test, Step::run("Test", "yarn test"))
            .step(Build, Step::run("Build", "yarn build")),
        Fragment::new(Axis::PackageManager, "pnpm", "pnpm")
            .requires(Axis::Language, &["nodejs"])
            .setup(Step::uses("Setup pnpm", "pnpm/action-setup@v4"))
            .setup(Step::run("Install dependencies", "pnpm install --frozen-lockfile"))
            .step(Lint, Step::run("Lint", "pnpm lint"))
            .step(Test, Step::run("Test", "pnpm test"))
            .step(Build, Step::run("Build", "pnpm build")),
        Fragment::new(Axis::PackageManager, "pip", "pip")
            .requires(Axis::Language, &["python"])
            .setup(Step::run(
                "Install dependencies",
                "python -m pip install --upgrade pip && pip install -r requirements.txt",
            ))
            .step(Lint, Step::run("Lint", "pip install ruff && ruff check ."))
            .step(Test, Step::run("Test", "python -m pytest"))
            .step(Build, Step::run("Build", "pip install build && python -m build")),
        Fragment::new(Axis::PackageManager, "poetry", "Poetry")
            .requires(Axis::Language, &["python"])
            .env("POETRY_VIRTUALENVS_CREATE", "false")
            .setup(Step::run("Install Poetry", "pipx install poetry"))
            .setup(Step::run("Install dependencies", "poetry install --no-interaction"))
            .step(Lint, Step::run("Lint", "poetry run ruff check ."))
            .step(Test, Step::run("Test", "poetry run pytest"))
            .step(Build, Step::run("Build", "poetry build")),
        Fragment::new(Axis::PackageManager, "gomod", "Go modules")
            .requires(Axis::Language, &["go"])
            .setup(Step::run("Download modules", "go mod download"))
            .step(Lint, Step::run("Lint", "go vet ./..."))
            .step(Test, Step::run("Test", "go test -race ./..."))
            .step(Build, Step::run("Build", "go build ./...")),
        Fragment::new(Axis::PackageManager, "maven", "Maven")
            .requires(Axis::Language, &["java"])
            .step(Lint, Step::run("Lint", "mvn -B checkstyle:check"))
            .step(Test, Step::run("Test", "mvn -B test"))
            .step(Build, Step::run("Build", "mvn -B package -DskipTests")),
        Fragment::new(Axis::PackageManager, "gradle", "Gradle")
            .requires(Axis::Language, &["java"])
            .setup(Step::uses("Setup Gradle", "gradle/actions/setup-gradle@v3"))
            .step(Lint, Step::run("Lint", "./gradlew check -x test"))
            .step(Test, Step::run("Test", "./gradlew test"))
            .step(Build, Step::run("Build", "./gradlew build -x test")),
        Fragment::new(Axis::PackageManager, "bundler", "Bundler")
            .requires(Axis::Language, &["ruby"])
            .excludes(
                Axis::Service,
                "lambda",
                "Bundler-managed native gems do not match the Lambda runtime image",
            )
            .setup(Step::run("Install gems", "bundle install --jobs 4"))
            .step(Lint, Step::run("Lint", "bundle exec rubocop"))
            .step(Test, Step::run("Test", "bundle exec rspec"))
            .step(Build, Step::run("Build", "bundle exec rake build")),
    ]
}

fn frameworks() -> Vec<Fragment> {
    vec![
        Fragment::new(Axis::Framework, "nextjs", "Next.js")
            .requires(Axis::Language, &["nodejs"])
            .env("NEXT_TELEMETRY_DISABLED", "1")
            .setup(
                Step::uses("Cache Next.js build", "actions/cache@v4")
                    .with_input("path", ".next/cache")
                    .with_input("key", "nextjs-${{ runner.os }}-${{ hashFiles('**/package-lock.json', '**/yarn.lock', '**/pnpm-lock.yaml') }}"),
            )
            .step(Lint, Step::run("Lint", "npx next lint"))
            .step(Build, Step::run("Build", "npx next build")),
        Fragment::new(Axis::Framework, "react", "React (Vite)")
            .requires(Axis::Language, &["nodejs"])
            .step(Build, Step::run("Build", "npx vite build")),
        Fragment::new(Axis::Framework, "nestjs", "NestJS")
            .requires(Axis::Language, &["nodejs"])
            .step(Build, Step::run("Build", "npx nest build")),
        Fragment::new(Axis::Framework, "django", "Django")
            .requires(Axis::Language, &["python"])
            .env("DJANGO_SETTINGS_MODULE", "config.settings")
            .step(Test, Step::run("Check migrations", "python manage.py makemigrations --check --dry-run"))
            .step(Test, Step::run("Test", "python manage.py test")),
        Fragment::new(Axis::Framework, "fastapi", "FastAPI")
            .requires(Axis::Language, &["python"])
            .env("APP_MODULE", "app.main:app")
            .step(Test, Step::run("Import check", "python -c \"import importlib; importlib.import_module('${APP_MODULE%%:*}')\"")),
        Fragment::new(Axis::Framework, "gin", "Gin")
            .requires(Axis::Language, &["go"])
            .env("CGO_ENABLED", "0")
            .step(Build, Step::run("Build", "go build -trimpath -ldflags=\"-s -w\" -o bin/server .")),
        Fragment::new(Axis::Framework, "spring-boot", "Spring Boot")
            .requires(Axis::Language, &["java"])
            .env("SPRING_PROFILES_ACTIVE", "ci"),
        Fragment::new(Axis::Framework, "rails", "Ruby on Rails")
            .requires(Axis::Language, &["ruby"])
            .requires(Axis::PackageManager, &["bundler"])
            .env("RAILS_ENV", "test")
            .step(Test, Step::run("Test", "bundle exec rails test"))
            .step(Build, Step::run("Build", "bundle exec rails assets:precompile")),
    ]
}

fn providers() -> Vec<Fragment> {
    vec![
        Fragment::new(Axis::Provider, "aws", "Amazon Web Services")
            .env("AWS_REGION", "us-east-1")
            .secret("AWS_ACCESS_KEY_ID")
            .secret("AWS_SECRET_ACCESS_KEY")
            .setting("region", "us-east-1")
            .step(
                Deploy,
                Step::uses("Configure cloud credentials", "aws-actions/configure-aws-credentials@v4")
                    .with_input("aws-access-key-id", "${{ secrets.AWS_ACCESS_KEY_ID }}")
                    .with_input("aws-secret-access-key", "${{ secrets.AWS_SECRET_ACCESS_KEY }}")
                    .with_input("aws-region", "${{ env.AWS_REGION }}"),
            ),
        Fragment::new(Axis::Provider, "gcp", "Google Cloud")
            .env("GCP_REGION", "us-central1")
            .secret("GCP_CREDENTIALS")
            .setting("region", "us-central1")
            .step(
                Deploy,
                Step::uses("Configure cloud credentials", "google-github-actions/auth@v2")
                    .with_input("credentials_json", "${{ secrets.GCP_CREDENTIALS }}"),
            )
            .step(Deploy, Step::uses("Setup gcloud", "google-github-actions/setup-gcloud@v2")),
        Fragment::new(Axis::Provider, "azure", "Microsoft Azure")
            .env("AZURE_LOCATION", "eastus")
            .env("AZURE_RESOURCE_GROUP", "app-rg")
            .secret("AZURE_CREDENTIALS")
            .setting("region", "eastus")
            .setting("resource_group", "app-rg")
            .step(
                Deploy,
                Step::uses("Configure cloud credentials", "azure/login@v2")
                    .with_input("creds", "${{ secrets.AZURE_CREDENTIALS }}"),
            ),
    ]
}

fn services() -> Vec<Fragment> {
    vec![
        Fragment::new(Axis::Service, "ecs", "Amazon ECS")
            .requires(Axis::Provider, &["aws"])
            .env("ECS_CLUSTER", "default")
            .setting("target", "ecs-service")
            .setting("cluster", "default")
            .step(Deploy, Step::uses("Login to container registry", "aws-actions/amazon-ecr-login@v2").with_id("registry"))
            .step(
                Deploy,
                Step::run(
                    "Build and push image",
                    "docker build -t \"$REGISTRY/$APP_NAME:$GITHUB_SHA\" . && docker push \"$REGISTRY/$APP_NAME:$GITHUB_SHA\"",
                )
                .with_env("REGISTRY", "${{ steps.registry.outputs.registry }}"),
            )
            .step(
                Deploy,
                Step::run(
                    "Deploy service",
                    "aws ecs update-service --cluster \"$ECS_CLUSTER\" --service \"$APP_NAME\" --force-new-deployment",
                ),
            ),
        Fragment::new(Axis::Service, "lambda", "AWS Lambda")
            .requires(Axis::Provider, &["aws"])
            .excludes(
                Axis::PackageManager,
                "bundler",
                "Bundler-managed native gems do not match the Lambda runtime image",
            )
            .env("LAMBDA_PUBLISH", "true")
            .setting("target", "function")
            .step(Deploy, Step::run("Package function", "zip -qr function.zip ."))
            .step(
                Deploy,
                Step::run(
                    "Deploy service",
                    "aws lambda update-function-code --function-name \"$APP_NAME\" --zip-file fileb://function.zip",
                ),
            )
            .step(
                Deploy,
                Step::run("Publish version", "aws lambda publish-version --function-name \"$APP_NAME\"")
                    .with_guard("env.LAMBDA_PUBLISH == 'true'"),
            ),
        Fragment::new(Axis::Service, "eks", "Amazon EKS")
            .requires(Axis::Provider, &["aws"])
            .env("EKS_CLUSTER", "default")
            .setting("target", "deployment")
            .setting("cluster", "default")
            .step(
                Deploy,
                Step::run("Configure kubectl", "aws eks update-kubeconfig --name \"$EKS_CLUSTER\" --region \"$AWS_REGION\""),
            )
            .step(
                Deploy,
                Step::run("Deploy service", "kubectl apply -f k8s/ && kubectl rollout status deployment/\"$APP_NAME\""),
            ),
        Fragment::new(Axis::Service, "cloudrun", "Cloud Run")
            .requires(Axis::Provider, &["gcp"])
            .setting("target", "cloud-run-service")
            .step(
                Deploy,
                Step::run("Deploy service", "gcloud run deploy \"$APP_NAME\" --source . --region \"$GCP_REGION\" --quiet"),
            ),
        Fragment::new(Axis::Service, "gke", "Google Kubernetes Engine")
            .requires(Axis::Provider, &["gcp"])
            .env("GKE_CLUSTER", "default")
            .setting("target", "deployment")
            .setting("cluster", "default")
            .step(
                Deploy,
                Step::uses("Configure kubectl", "google-github-actions/get-gke-credentials@v2")
                    .with_input("cluster_name", "${{ env.GKE_CLUSTER }}")
                    .with_input("location", "${{ env.GCP_REGION }}"),
            )
            .step(
                Deploy,
                Step::run("Deploy service", "kubectl apply -f k8s/ && kubectl rollout status deployment/\"$APP_NAME\""),
            ),
        Fragment::new(Axis::Service, "appservice", "Azure App Service")
            .requires(Axis::Provider, &["azure"])
            .setting("target", "web-app")
            .step(
                Deploy,
                Step::uses("Deploy service", "azure/webapps-deploy@v3")
                    .with_input("app-name", "${{ env.APP_NAME }}")
                    .with_input("package", "."),
            ),
        Fragment::new(Axis::Service, "aks", "Azure Kubernetes Service")
            .requires(Axis::Provider, &["azure"])
            .env("AKS_CLUSTER", "default")
            .setting("target", "deployment")
            .setting("cluster", "default")
            .step(
                Deploy,
                Step::uses("Configure kubectl", "azure/aks-set-context@v4")
                    .with_input("resource-group", "${{ env.AZURE_RESOURCE_GROUP }}")
                    .with_input("cluster-name", "${{ env.AKS_CLUSTER }}"),
            )
            .step(
                Deploy,
                Step::run("Deploy service", "kubectl apply -f k8s/ && kubectl rollout status deployment/\"$APP_NAME\""),
            ),
    ]
}

fn hooks() -> Vec<Fragment> {
    vec![
        Fragment::new(Axis::Hooks, "security-scan", "Dependency security scan").step(
            PreBuild,
            Step::uses("Scan dependencies", "aquasecurity/trivy-action@0.24.0")
                .with_input("scan-type", "fs")
                .with_input("severity", "CRITICAL,HIGH")
                .with_input("exit-code", "1"),
        ),
        Fragment::new(Axis::Hooks, "hotfix", "Hotfix release workflow")
            .describe("Emits a separate workflow for `v<semver>-hotfix.<n>` releases")
            .step(
                PreDeploy,
                Step::run("Announce hotfix", "echo \"::notice::Hotfix release $GITHUB_REF_NAME\"")
                    .with_guard("contains(github.ref_name, '-hotfix.')"),
            ),
        Fragment::new(Axis::Hooks, "rollback", "Rollback workflow")
            .describe("Emits a manually dispatched workflow that redeploys a previous tag")
            .step(
                PostDeploy,
                Step::run(
                    "Record deployed version",
                    "echo \"Deployed $GITHUB_REF_NAME ($GITHUB_SHA)\" >> \"$GITHUB_STEP_SUMMARY\"",
                ),
            ),
        Fragment::new(Axis::Hooks, "smoke-test", "Post-deploy smoke test")
            .env("SMOKE_TEST_URL", "")
            .step(
                PostDeploy,
                Step::run("Smoke test", "curl --fail --retry 5 --retry-delay 10 \"$SMOKE_TEST_URL\"")
                    .with_guard("env.SMOKE_TEST_URL != ''"),
            ),
        Fragment::new(Axis::Hooks, "notify-slack", "Slack notification")
            .secret("SLACK_WEBHOOK_URL")
            .step(
                PostDeploy,
                Step::uses("Notify Slack", "slackapi/slack-github-action@v1.27.0")
                    .with_input(
                        "payload",
                        "{\"text\": \"${{ github.repository }} ${{ github.ref_name }}: ${{ job.status }}\"}",
                    )
                    .with_guard("always()")
                    .with_env("SLACK_WEBHOOK_URL", "${{ secrets.SLACK_WEBHOOK_URL }}")
                    .with_env("SLACK_WEBHOOK_TYPE", "INCOMING_WEBHOOK"),
            ),
    ]
}
